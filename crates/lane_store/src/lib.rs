use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use gate_core::RecordSource;
use shared::domain::{Lane, LaneFilter, LaneId, OutcomeKind, TransactionRecord};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub mod fixtures;
pub mod history;

pub use history::HistoryEntry;

/// In-memory lane board, active transactions and correction history.
#[derive(Clone)]
pub struct LaneStore {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    lanes: Vec<Lane>,
    transactions: HashMap<LaneId, TransactionRecord>,
    /// Record served for busy lanes that have no capture of their own.
    fallback: Option<TransactionRecord>,
    history: Vec<HistoryEntry>,
}

impl LaneStore {
    pub fn new(
        lanes: Vec<Lane>,
        transactions: Vec<TransactionRecord>,
        history: Vec<HistoryEntry>,
    ) -> Self {
        Self::from_parts(lanes, transactions, None, history)
    }

    /// Seven-lane board with the L02/L03 captures; other busy lanes reuse the L03 capture.
    pub fn with_fixtures() -> Self {
        let transactions = fixtures::transactions();
        let fallback = transactions
            .iter()
            .find(|record| record.lane_id.as_str() == "L03")
            .cloned();
        Self::from_parts(fixtures::lanes(), transactions, fallback, fixtures::history())
    }

    fn from_parts(
        lanes: Vec<Lane>,
        transactions: Vec<TransactionRecord>,
        fallback: Option<TransactionRecord>,
        history: Vec<HistoryEntry>,
    ) -> Self {
        let transactions = transactions
            .into_iter()
            .map(|record| (record.lane_id.clone(), record))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(Inner {
                lanes,
                transactions,
                fallback,
                history,
            })),
        }
    }

    pub async fn list_lanes(&self, filter: &LaneFilter) -> Vec<Lane> {
        let inner = self.inner.read().await;
        inner
            .lanes
            .iter()
            .filter(|lane| filter.matches(lane))
            .cloned()
            .collect()
    }

    pub async fn lane(&self, lane_id: &LaneId) -> Option<Lane> {
        let inner = self.inner.read().await;
        inner.lanes.iter().find(|lane| lane.id == *lane_id).cloned()
    }

    /// Active transaction of a lane; `None` for idle or unknown lanes.
    pub async fn transaction(&self, lane_id: &LaneId) -> Option<TransactionRecord> {
        let inner = self.inner.read().await;
        let lane = inner.lanes.iter().find(|lane| lane.id == *lane_id)?;
        if !lane.has_transaction() {
            return None;
        }
        if let Some(record) = inner.transactions.get(lane_id) {
            return Some(record.clone());
        }
        inner.fallback.as_ref().map(|template| {
            let mut record = template.clone();
            record.lane_id = lane_id.clone();
            record.status = lane.status;
            record
        })
    }

    /// Newest first; an empty query returns every entry.
    pub async fn search_history(&self, query: &str) -> Vec<HistoryEntry> {
        let inner = self.inner.read().await;
        let mut entries: Vec<HistoryEntry> = inner
            .history
            .iter()
            .filter(|entry| entry.matches(query))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        entries
    }

    async fn apply_commit(
        &self,
        record: &TransactionRecord,
        outcome: OutcomeKind,
        recorded_at: NaiveDateTime,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let lane = inner
            .lanes
            .iter_mut()
            .find(|lane| lane.id == record.lane_id)
            .ok_or_else(|| anyhow!("unknown lane {}", record.lane_id))?;
        lane.container_no = Some(record.ocr_data.container_no.clone())
            .filter(|value| !value.is_empty());
        lane.current_truck = Some(record.ocr_data.truck_plate.clone())
            .filter(|value| !value.is_empty());
        let lane_name = lane.name.clone();

        inner
            .transactions
            .insert(record.lane_id.clone(), record.clone());
        inner
            .history
            .push(HistoryEntry::from_commit(record, outcome, &lane_name, recorded_at));
        debug!(lane_id = %record.lane_id, entries = inner.history.len(), "history appended");
        Ok(())
    }
}

impl Default for LaneStore {
    fn default() -> Self {
        Self::with_fixtures()
    }
}

#[async_trait]
impl RecordSource for LaneStore {
    async fn lanes(&self) -> Result<Vec<Lane>> {
        Ok(self.list_lanes(&LaneFilter::All).await)
    }

    async fn fetch_active_transaction(
        &self,
        lane_id: &LaneId,
    ) -> Result<Option<TransactionRecord>> {
        Ok(self.transaction(lane_id).await)
    }

    async fn record_commit(&self, record: &TransactionRecord, outcome: OutcomeKind) -> Result<()> {
        self.apply_commit(record, outcome, Local::now().naive_local())
            .await?;
        info!(
            lane_id = %record.lane_id,
            session_id = %record.session_id,
            outcome = ?outcome,
            "correction recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
