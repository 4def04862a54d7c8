//! Dashboard events and operator-facing sync failure notices.

use serde::Serialize;
use shared::{
    domain::{LaneId, OutcomeKind},
    error::ErrorCode,
};
use uuid::Uuid;

use crate::sync::SyncError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    LaneSelected {
        lane_id: LaneId,
        has_transaction: bool,
    },
    CorrectionCommitted {
        lane_id: LaneId,
        outcome: OutcomeKind,
    },
    SyncStarted {
        request_id: Uuid,
        lane_id: LaneId,
    },
    SyncCompleted {
        request_id: Uuid,
        lane_id: LaneId,
    },
    SyncFailed {
        request_id: Uuid,
        lane_id: LaneId,
        notice: SyncFailureNotice,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncFailureCategory {
    Timeout,
    Rejected,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailureNotice {
    category: SyncFailureCategory,
    message: String,
    detail: String,
}

impl SyncFailureNotice {
    pub fn category(&self) -> SyncFailureCategory {
        self.category
    }

    /// Short text for the overlay.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw error as reported by the sink.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

pub fn classify_sync_failure(err: &SyncError) -> SyncFailureNotice {
    let detail = err.to_string();
    let category = match err {
        SyncError::TimedOut { .. } => SyncFailureCategory::Timeout,
        SyncError::Rejected(inner) if inner.code == ErrorCode::Timeout => {
            SyncFailureCategory::Timeout
        }
        SyncError::Rejected(_) => SyncFailureCategory::Rejected,
        SyncError::Transport(message) => category_from_message(message),
    };

    let message = match category {
        SyncFailureCategory::Timeout => {
            "TOS không phản hồi; dữ liệu đã lưu cục bộ, vui lòng thử đồng bộ lại.".to_string()
        }
        SyncFailureCategory::Rejected => {
            format!("TOS từ chối cập nhật: {detail}")
        }
        SyncFailureCategory::Transport => {
            "Mất kết nối tới TOS; kiểm tra mạng và thử đồng bộ lại.".to_string()
        }
        SyncFailureCategory::Unknown => format!("Lỗi đồng bộ TOS: {detail}"),
    };

    SyncFailureNotice {
        category,
        message,
        detail,
    }
}

fn category_from_message(message: &str) -> SyncFailureCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        SyncFailureCategory::Timeout
    } else if lower.contains("connection")
        || lower.contains("network")
        || lower.contains("unreachable")
        || lower.contains("dns")
        || lower.contains("reset")
    {
        SyncFailureCategory::Transport
    } else {
        SyncFailureCategory::Unknown
    }
}
