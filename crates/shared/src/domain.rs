use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(LaneId);
id_newtype!(TransactionId);
id_newtype!(SessionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LaneStatus {
    #[default]
    Idle,
    Waiting,
    Processing,
    Success,
    Failed,
}

impl LaneStatus {
    /// Operator-facing label shown on the lane board.
    pub fn label(self) -> &'static str {
        match self {
            LaneStatus::Waiting => "Chờ giám định",
            LaneStatus::Success => "Hoàn thành",
            LaneStatus::Failed => "Sai lệch / Lỗi",
            LaneStatus::Processing => "Đang xử lý",
            LaneStatus::Idle => "---",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    pub id: LaneId,
    pub name: String,
    #[serde(rename = "type")]
    pub direction: LaneDirection,
    pub status: LaneStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_truck: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub last_updated: String,
}

impl Lane {
    pub fn has_transaction(&self) -> bool {
        self.status != LaneStatus::Idle
    }
}

/// Lane board filter: everything, one direction, or a single lane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LaneFilter {
    #[default]
    All,
    Direction(LaneDirection),
    Lane(LaneId),
}

impl LaneFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            LaneFilter::All
        } else if raw.eq_ignore_ascii_case("inbound") {
            LaneFilter::Direction(LaneDirection::Inbound)
        } else if raw.eq_ignore_ascii_case("outbound") {
            LaneFilter::Direction(LaneDirection::Outbound)
        } else {
            LaneFilter::Lane(LaneId::new(raw))
        }
    }

    pub fn matches(&self, lane: &Lane) -> bool {
        match self {
            LaneFilter::All => true,
            LaneFilter::Direction(direction) => lane.direction == *direction,
            LaneFilter::Lane(id) => lane.id == *id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureImages {
    pub panorama: String,
    pub front: String,
    pub back: String,
    pub left: String,
    pub right: String,
    pub top: String,
}

/// Values read by OCR. An empty string means the field was not recognized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrData {
    pub container_no: String,
    pub iso_code: String,
    pub truck_plate: String,
    pub trailer_plate: String,
    pub seal_no: String,
}

/// Values held by the terminal operating system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    pub container_no: String,
    pub iso_code: String,
    pub truck_plate: String,
    pub trailer_plate: String,
    pub seal_no: String,
    pub vgm: String,
    pub booking_no: String,
    pub eir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub session_id: SessionId,
    pub timestamp: String,
    pub lane_id: LaneId,
    pub status: LaneStatus,
    pub images: CaptureImages,
    pub ocr_data: OcrData,
    pub system_data: SystemData,
    pub notes: String,
}

impl TransactionRecord {
    pub fn has_transaction(&self) -> bool {
        self.status != LaneStatus::Idle
    }
}

/// How a submitted correction is classified before it is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    #[default]
    None,
    PlainUpdate,
    PassgateConfirmed,
}

impl OutcomeKind {
    /// Note written into the committed record.
    pub fn commit_note(self) -> &'static str {
        match self {
            OutcomeKind::PassgateConfirmed => "Đã xác nhận Passgate thành công",
            OutcomeKind::PlainUpdate | OutcomeKind::None => "Đã cập nhật thủ công",
        }
    }

    /// Text of the confirmation notice shown before acknowledging.
    pub fn confirmation_notice(self) -> &'static str {
        match self {
            OutcomeKind::PassgateConfirmed => "Đã yêu cầu cho Passgate thành công",
            OutcomeKind::PlainUpdate | OutcomeKind::None => "Đã cập nhật dữ liệu thành công",
        }
    }
}
