use chrono::NaiveDateTime;
use serde::Serialize;
use shared::domain::{LaneStatus, OutcomeKind, SessionId, TransactionRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub recorded_at: NaiveDateTime,
    pub lane: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub container_no: String,
    pub truck_plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeKind>,
    pub status: LaneStatus,
}

impl HistoryEntry {
    pub(crate) fn fixture(
        recorded_at: NaiveDateTime,
        lane: &str,
        container_no: &str,
        truck_plate: &str,
        status: LaneStatus,
    ) -> Self {
        Self {
            recorded_at,
            lane: lane.to_string(),
            session_id: None,
            container_no: container_no.to_string(),
            truck_plate: truck_plate.to_string(),
            outcome: None,
            status,
        }
    }

    pub fn from_commit(
        record: &TransactionRecord,
        outcome: OutcomeKind,
        lane: &str,
        recorded_at: NaiveDateTime,
    ) -> Self {
        Self {
            recorded_at,
            lane: lane.to_string(),
            session_id: Some(record.session_id.clone()),
            container_no: record.ocr_data.container_no.clone(),
            truck_plate: record.ocr_data.truck_plate.clone(),
            outcome: Some(outcome),
            status: record.status,
        }
    }

    /// Case-insensitive substring match on container, truck plate or session id.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let session = self
            .session_id
            .as_ref()
            .map(|id| id.as_str().to_lowercase())
            .unwrap_or_default();
        self.container_no.to_lowercase().contains(&query)
            || self.truck_plate.to_lowercase().contains(&query)
            || session.contains(&query)
    }
}
