use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{LaneId, OutcomeKind, TransactionRecord},
    error::GateError,
};

/// Body handed to the TOS commit sink: the full corrected record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRequest {
    pub request_id: Uuid,
    pub outcome: OutcomeKind,
    pub submitted_at: DateTime<Utc>,
    pub record: TransactionRecord,
}

impl CorrectionRequest {
    pub fn new(record: TransactionRecord, outcome: OutcomeKind) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            outcome,
            submitted_at: Utc::now(),
            record,
        }
    }

    pub fn lane_id(&self) -> &LaneId {
        &self.record.lane_id
    }
}

/// Positive acknowledgement from the TOS. Carries no required body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAck {
    pub request_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

/// TOS reply to a submitted correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SyncResponse {
    Ack(SyncAck),
    Error(GateError),
}

impl SyncResponse {
    pub fn into_result(self) -> Result<SyncAck, GateError> {
        match self {
            SyncResponse::Ack(ack) => Ok(ack),
            SyncResponse::Error(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{CaptureImages, LaneStatus, OcrData, SessionId, SystemData, TransactionId},
        error::ErrorCode,
    };

    fn record() -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new("TRX-2025-L02"),
            session_id: SessionId::new("SMG211020250002"),
            timestamp: "21/10/2025 13:21:44".into(),
            lane_id: LaneId::new("L02"),
            status: LaneStatus::Waiting,
            images: CaptureImages::default(),
            ocr_data: OcrData::default(),
            system_data: SystemData::default(),
            notes: String::new(),
        }
    }

    #[test]
    fn request_json_embeds_full_record() {
        let request = CorrectionRequest::new(record(), OutcomeKind::PlainUpdate);
        let value = serde_json::to_value(&request).expect("json");
        assert_eq!(value["outcome"], "plain_update");
        assert_eq!(value["record"]["sessionId"], "SMG211020250002");
        assert_eq!(request.lane_id().as_str(), "L02");
    }

    #[test]
    fn error_response_maps_to_err() {
        let response = SyncResponse::Error(GateError::new(ErrorCode::Rejected, "locked"));
        let err = response.into_result().expect_err("rejected");
        assert_eq!(err.code, ErrorCode::Rejected);
    }

    #[test]
    fn ack_response_decodes_from_tagged_json() {
        let request_id = Uuid::new_v4();
        let response: SyncResponse = serde_json::from_value(serde_json::json!({
            "type": "ack",
            "payload": { "request_id": request_id },
        }))
        .expect("decode");
        let ack = response.into_result().expect("ack");
        assert_eq!(ack.request_id, request_id);
        assert_eq!(ack.acknowledged_at, None);
    }
}
