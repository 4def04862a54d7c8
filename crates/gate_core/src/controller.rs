//! Dashboard controller: owns the selected lane, its record, the correction
//! workflow and the TOS sync overlay.

use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use shared::{
    domain::{Lane, LaneFilter, LaneId, OutcomeKind, TransactionRecord},
    protocol::{CorrectionRequest, SyncAck},
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    correction::{
        CorrectionError, CorrectionWorkflow, EditableFields, FlagField, TextField, TrackedField,
        WorkflowPhase,
    },
    events::{classify_sync_failure, DashboardEvent, SyncFailureNotice},
    reconciliation::{reconcile, ReconciliationOptions, ReconciliationView},
    sync::{submit_with_policy, CommitSink, SyncError, SyncPolicy},
    RecordSource,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const SEARCH_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("TOS sync in progress; wait for it to finish")]
    SyncInProgress,
    #[error("a failed TOS sync is pending; retry or dismiss it first")]
    SyncFailurePending,
    #[error("no failed TOS sync to retry or dismiss")]
    NoFailedSync,
    #[error("no lane selected")]
    NoLaneSelected,
    #[error("lane {0} has no active transaction")]
    NoActiveTransaction(LaneId),
    #[error("close the correction session first")]
    CorrectionOpen,
    #[error(transparent)]
    Correction(#[from] CorrectionError),
    #[error("record source failed")]
    Source(#[source] anyhow::Error),
    #[error("{}", .0.message())]
    SyncFailed(SyncFailureNotice),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncOverlay {
    Idle,
    /// Non-interactive; every operator action is refused until it clears.
    Syncing { request_id: Uuid, lane_id: LaneId },
    /// Dismissible. The committed record stays in place; the request is kept
    /// for a manual retry.
    Failed {
        request: CorrectionRequest,
        notice: SyncFailureNotice,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardOptions {
    pub include_seal_row: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub selected_lane: Option<LaneId>,
    pub view: ReconciliationView,
    pub phase: WorkflowPhase,
    pub fields: Option<EditableFields>,
    pub iso_system: Option<String>,
    pub change_count: usize,
    pub changed_fields: Vec<TrackedField>,
    pub outcome: OutcomeKind,
    pub overlay: SyncOverlay,
}

struct DashboardState {
    selected_lane: Option<LaneId>,
    record: Option<TransactionRecord>,
    workflow: CorrectionWorkflow,
    overlay: SyncOverlay,
}

impl DashboardState {
    fn ensure_interactive(&self) -> Result<(), DashboardError> {
        match self.overlay {
            SyncOverlay::Syncing { .. } => Err(DashboardError::SyncInProgress),
            _ => Ok(()),
        }
    }

    fn active_record(&self) -> Result<&TransactionRecord, DashboardError> {
        let lane_id = self
            .selected_lane
            .as_ref()
            .ok_or(DashboardError::NoLaneSelected)?;
        self.record
            .as_ref()
            .filter(|record| record.has_transaction())
            .ok_or_else(|| DashboardError::NoActiveTransaction(lane_id.clone()))
    }
}

#[derive(Clone)]
pub struct GateDashboard {
    state: Arc<Mutex<DashboardState>>,
    source: Arc<dyn RecordSource>,
    sink: Arc<dyn CommitSink>,
    policy: SyncPolicy,
    options: DashboardOptions,
    events: broadcast::Sender<DashboardEvent>,
}

impl GateDashboard {
    pub fn new(
        source: Arc<dyn RecordSource>,
        sink: Arc<dyn CommitSink>,
        policy: SyncPolicy,
        options: DashboardOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(DashboardState {
                selected_lane: None,
                record: None,
                workflow: CorrectionWorkflow::new(),
                overlay: SyncOverlay::Idle,
            })),
            source,
            sink,
            policy,
            options,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub async fn lanes(&self, filter: &LaneFilter) -> Result<Vec<Lane>, DashboardError> {
        let lanes = self.source.lanes().await.map_err(DashboardError::Source)?;
        Ok(lanes.into_iter().filter(|lane| filter.matches(lane)).collect())
    }

    /// Loads the lane's active transaction. Any open correction session is
    /// discarded.
    pub async fn select_lane(&self, lane_id: &LaneId) -> Result<ReconciliationView, DashboardError> {
        self.state.lock().await.ensure_interactive()?;

        let record = self
            .source
            .fetch_active_transaction(lane_id)
            .await
            .map_err(DashboardError::Source)?;

        let mut state = self.state.lock().await;
        state.ensure_interactive()?;
        state.workflow.force_close();
        state.selected_lane = Some(lane_id.clone());
        state.record = record;

        let has_transaction = state
            .record
            .as_ref()
            .is_some_and(TransactionRecord::has_transaction);
        info!(lane_id = %lane_id, has_transaction, "lane selected");
        self.emit(DashboardEvent::LaneSelected {
            lane_id: lane_id.clone(),
            has_transaction,
        });

        Ok(self.view_of(&state))
    }

    pub async fn view(&self) -> ReconciliationView {
        let state = self.state.lock().await;
        self.view_of(&state)
    }

    pub async fn current_record(&self) -> Option<TransactionRecord> {
        self.state.lock().await.record.clone()
    }

    pub async fn open_correction(&self) -> Result<EditableFields, DashboardError> {
        let mut state = self.state.lock().await;
        state.ensure_interactive()?;
        let record = state.active_record()?.clone();
        state.workflow.open(&record)?;
        state
            .workflow
            .session()
            .map(|session| session.fields().clone())
            .ok_or(DashboardError::Correction(CorrectionError::NotOpen))
    }

    /// Returns the change count after the edit.
    pub async fn edit(&self, field: TextField, value: &str) -> Result<usize, DashboardError> {
        let mut state = self.state.lock().await;
        state.ensure_interactive()?;
        Ok(state.workflow.edit(field, value)?)
    }

    pub async fn set_flag(&self, flag: FlagField, value: bool) -> Result<usize, DashboardError> {
        let mut state = self.state.lock().await;
        state.ensure_interactive()?;
        Ok(state.workflow.set_flag(flag, value)?)
    }

    pub async fn reset_correction(&self) -> Result<(), DashboardError> {
        let mut state = self.state.lock().await;
        state.ensure_interactive()?;
        Ok(state.workflow.reset()?)
    }

    pub async fn cancel_correction(&self) -> Result<(), DashboardError> {
        let mut state = self.state.lock().await;
        state.ensure_interactive()?;
        Ok(state.workflow.cancel()?)
    }

    pub async fn submit_correction(&self) -> Result<OutcomeKind, DashboardError> {
        let mut state = self.state.lock().await;
        state.ensure_interactive()?;
        Ok(state.workflow.submit()?)
    }

    /// Commits the confirmed correction, applies it to the view and syncs it to
    /// the TOS. A sync failure leaves the committed record in place and parks
    /// the request on the overlay for `retry_sync`.
    pub async fn acknowledge(&self) -> Result<SyncAck, DashboardError> {
        let request = {
            let mut state = self.state.lock().await;
            state.ensure_interactive()?;
            if matches!(state.overlay, SyncOverlay::Failed { .. }) {
                return Err(DashboardError::SyncFailurePending);
            }

            let committed = state.workflow.acknowledge()?;
            state.record = Some(committed.record.clone());
            let request = CorrectionRequest::new(committed.record, committed.outcome);
            state.overlay = SyncOverlay::Syncing {
                request_id: request.request_id,
                lane_id: request.lane_id().clone(),
            };
            request
        };

        info!(
            lane_id = %request.lane_id(),
            request_id = %request.request_id,
            outcome = ?request.outcome,
            container_no = %request.record.ocr_data.container_no,
            "correction committed"
        );
        self.emit(DashboardEvent::CorrectionCommitted {
            lane_id: request.lane_id().clone(),
            outcome: request.outcome,
        });

        self.spawn_sync(request, true).await
    }

    pub async fn retry_sync(&self) -> Result<SyncAck, DashboardError> {
        let request = {
            let mut state = self.state.lock().await;
            match std::mem::replace(&mut state.overlay, SyncOverlay::Idle) {
                SyncOverlay::Failed { request, .. } => {
                    state.overlay = SyncOverlay::Syncing {
                        request_id: request.request_id,
                        lane_id: request.lane_id().clone(),
                    };
                    request
                }
                other => {
                    let err = match other {
                        SyncOverlay::Syncing { .. } => DashboardError::SyncInProgress,
                        _ => DashboardError::NoFailedSync,
                    };
                    state.overlay = other;
                    return Err(err);
                }
            }
        };

        info!(request_id = %request.request_id, "retrying TOS sync");
        self.spawn_sync(request, false).await
    }

    /// Closes the failure overlay. The local record keeps the correction even
    /// though the TOS never acknowledged it.
    pub async fn dismiss_sync_error(&self) -> Result<(), DashboardError> {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut state.overlay, SyncOverlay::Idle) {
            SyncOverlay::Failed { request, .. } => {
                warn!(
                    request_id = %request.request_id,
                    lane_id = %request.lane_id(),
                    "sync failure dismissed; TOS not updated"
                );
                Ok(())
            }
            other => {
                let err = match other {
                    SyncOverlay::Syncing { .. } => DashboardError::SyncInProgress,
                    _ => DashboardError::NoFailedSync,
                };
                state.overlay = other;
                Err(err)
            }
        }
    }

    /// Overrides the OCR truck plate and/or container number of the current
    /// record with the operator's query and stamps it with the current time.
    pub async fn search(
        &self,
        truck_plate: &str,
        container_no: &str,
    ) -> Result<ReconciliationView, DashboardError> {
        let truck_plate = truck_plate.trim();
        let container_no = container_no.trim();

        let mut state = self.state.lock().await;
        state.ensure_interactive()?;
        if state.workflow.is_open() {
            return Err(DashboardError::CorrectionOpen);
        }
        if truck_plate.is_empty() && container_no.is_empty() {
            return Ok(self.view_of(&state));
        }
        state.active_record()?;

        if let Some(record) = state.record.as_mut() {
            if !container_no.is_empty() {
                record.ocr_data.container_no = container_no.to_string();
            }
            if !truck_plate.is_empty() {
                record.ocr_data.truck_plate = truck_plate.to_string();
            }
            record.timestamp = Local::now().format(SEARCH_TIMESTAMP_FORMAT).to_string();
            debug!(lane_id = %record.lane_id, truck_plate, container_no, "search applied");
        }

        Ok(self.view_of(&state))
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.lock().await;
        let session = state.workflow.session();
        DashboardSnapshot {
            selected_lane: state.selected_lane.clone(),
            view: self.view_of(&state),
            phase: state.workflow.phase(),
            fields: session.map(|session| session.fields().clone()),
            iso_system: session.map(|session| session.iso_system().to_string()),
            change_count: state.workflow.change_count(),
            changed_fields: session
                .map(|session| session.changed_fields())
                .unwrap_or_default(),
            outcome: state.workflow.outcome(),
            overlay: state.overlay.clone(),
        }
    }

    /// Drives the sync on its own task. The caller may stop waiting at any
    /// point; the overlay still settles on `Idle` or `Failed`.
    async fn spawn_sync(
        &self,
        request: CorrectionRequest,
        record_commit: bool,
    ) -> Result<SyncAck, DashboardError> {
        let dashboard = self.clone();
        let task_request = request.clone();
        let task = tokio::spawn(async move {
            if record_commit {
                dashboard.record_commit(&task_request).await;
            }
            dashboard.run_sync(task_request).await
        });

        match task.await {
            Ok(result) => result,
            Err(err) => {
                let failure = SyncError::Transport(format!("sync task ended early: {err}"));
                Err(self.fail_sync(request, &failure).await)
            }
        }
    }

    async fn record_commit(&self, request: &CorrectionRequest) {
        if let Err(err) = self
            .source
            .record_commit(&request.record, request.outcome)
            .await
        {
            warn!(
                error = %err,
                lane_id = %request.lane_id(),
                "failed to record committed correction"
            );
        }
    }

    async fn run_sync(&self, request: CorrectionRequest) -> Result<SyncAck, DashboardError> {
        self.emit(DashboardEvent::SyncStarted {
            request_id: request.request_id,
            lane_id: request.lane_id().clone(),
        });

        match submit_with_policy(self.sink.as_ref(), &request, &self.policy).await {
            Ok(ack) => {
                let mut state = self.state.lock().await;
                state.overlay = SyncOverlay::Idle;
                self.emit(DashboardEvent::SyncCompleted {
                    request_id: request.request_id,
                    lane_id: request.lane_id().clone(),
                });
                Ok(ack)
            }
            Err(err) => Err(self.fail_sync(request, &err).await),
        }
    }

    /// Parks `request` on the failure overlay for a manual retry.
    async fn fail_sync(&self, request: CorrectionRequest, err: &SyncError) -> DashboardError {
        let notice = classify_sync_failure(err);
        error!(
            request_id = %request.request_id,
            lane_id = %request.lane_id(),
            error = %err,
            "TOS sync failed"
        );

        let mut state = self.state.lock().await;
        self.emit(DashboardEvent::SyncFailed {
            request_id: request.request_id,
            lane_id: request.lane_id().clone(),
            notice: notice.clone(),
        });
        state.overlay = SyncOverlay::Failed {
            request,
            notice: notice.clone(),
        };
        DashboardError::SyncFailed(notice)
    }

    fn view_of(&self, state: &DashboardState) -> ReconciliationView {
        reconcile(
            state.selected_lane.as_ref(),
            state.record.as_ref(),
            ReconciliationOptions {
                include_seal: self.options.include_seal_row,
            },
        )
    }

    fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
