use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{Lane, LaneId, OutcomeKind, TransactionRecord};

pub mod controller;
pub mod correction;
pub mod events;
pub mod reconciliation;
pub mod sync;

pub use controller::{
    DashboardError, DashboardOptions, DashboardSnapshot, GateDashboard, SyncOverlay,
};
pub use correction::{
    CommittedCorrection, CorrectionError, CorrectionSession, CorrectionWorkflow, EditableFields,
    FlagField, TextField, TrackedField, WorkflowPhase,
};
pub use events::{classify_sync_failure, DashboardEvent, SyncFailureCategory, SyncFailureNotice};
pub use reconciliation::{
    reconcile, ActiveReconciliation, FieldComparison, FieldVerdict, ReconciledField,
    ReconciliationOptions, ReconciliationView,
};
pub use sync::{
    submit_with_policy, CommitSink, SimulatedFailure, SimulatedTosSync, SyncError, SyncPolicy,
};

/// Supplies lane state and the active transaction of each lane.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn lanes(&self) -> Result<Vec<Lane>>;

    /// `None` when the lane is idle or unknown.
    async fn fetch_active_transaction(&self, lane_id: &LaneId)
        -> Result<Option<TransactionRecord>>;

    /// Called once per acknowledged correction, before the TOS sync starts.
    async fn record_commit(&self, record: &TransactionRecord, outcome: OutcomeKind) -> Result<()>;
}
