//! TOS synchronisation of committed corrections.

use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    error::{ErrorCode, GateError},
    protocol::{CorrectionRequest, SyncAck, SyncResponse},
};
use thiserror::Error;
use tokio::time;
use tracing::{debug, info, warn};

pub const DEFAULT_SYNC_LATENCY: Duration = Duration::from_millis(2000);
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_SYNC_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("TOS rejected correction: {}", .0.message)]
    Rejected(GateError),
    #[error("TOS sync timed out after {}ms", .after.as_millis())]
    TimedOut { after: Duration },
    #[error("TOS transport failure: {0}")]
    Transport(String),
}

impl SyncError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SyncError::Rejected(err) => err.code,
            SyncError::TimedOut { .. } => ErrorCode::Timeout,
            SyncError::Transport(_) => ErrorCode::Unavailable,
        }
    }
}

impl From<GateError> for SyncError {
    fn from(value: GateError) -> Self {
        SyncError::Rejected(value)
    }
}

/// Receives committed corrections, one call per acknowledged session.
#[async_trait]
pub trait CommitSink: Send + Sync {
    async fn submit_correction(&self, request: &CorrectionRequest) -> Result<SyncAck, SyncError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SYNC_TIMEOUT,
            max_attempts: 1,
            retry_delay: DEFAULT_SYNC_RETRY_DELAY,
        }
    }
}

/// Submits `request`, bounding each attempt by the policy timeout and retrying
/// up to `max_attempts` times. Returns the last error when every attempt fails.
pub async fn submit_with_policy(
    sink: &dyn CommitSink,
    request: &CorrectionRequest,
    policy: &SyncPolicy,
) -> Result<SyncAck, SyncError> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = SyncError::Transport("sync was not attempted".to_string());

    for attempt in 1..=attempts {
        if attempt > 1 {
            time::sleep(policy.retry_delay).await;
        }
        debug!(request_id = %request.request_id, attempt, "submitting correction to TOS");

        let result = match time::timeout(policy.timeout, sink.submit_correction(request)).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::TimedOut {
                after: policy.timeout,
            }),
        };

        match result {
            Ok(ack) => {
                info!(
                    request_id = %request.request_id,
                    lane_id = %request.lane_id(),
                    attempt,
                    "TOS acknowledged correction"
                );
                return Ok(ack);
            }
            Err(err) => {
                warn!(
                    request_id = %request.request_id,
                    attempt,
                    attempts,
                    error = %err,
                    "TOS sync attempt failed"
                );
                last_error = err;
            }
        }
    }

    Err(last_error)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulatedFailure {
    #[default]
    Never,
    Always,
    /// Every n-th call is rejected (1-based).
    EveryNth(u32),
}

/// Stand-in for the TOS endpoint: waits a fixed latency, then acknowledges or
/// rejects according to its failure mode.
#[derive(Debug)]
pub struct SimulatedTosSync {
    latency: Duration,
    failure: SimulatedFailure,
    calls: AtomicU32,
}

impl SimulatedTosSync {
    pub fn new(latency: Duration) -> Self {
        Self::with_failure(latency, SimulatedFailure::Never)
    }

    pub fn with_failure(latency: Duration, failure: SimulatedFailure) -> Self {
        Self {
            latency,
            failure,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedTosSync {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_LATENCY)
    }
}

#[async_trait]
impl CommitSink for SimulatedTosSync {
    async fn submit_correction(&self, request: &CorrectionRequest) -> Result<SyncAck, SyncError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        time::sleep(self.latency).await;

        let rejected = match self.failure {
            SimulatedFailure::Never => false,
            SimulatedFailure::Always => true,
            SimulatedFailure::EveryNth(n) => n > 0 && call % n == 0,
        };
        let response = if rejected {
            SyncResponse::Error(GateError::new(
                ErrorCode::Rejected,
                format!(
                    "session {} is locked by the terminal operating system",
                    request.record.session_id
                ),
            ))
        } else {
            SyncResponse::Ack(SyncAck {
                request_id: request.request_id,
                acknowledged_at: Some(Utc::now()),
            })
        };
        debug!(request_id = %request.request_id, call, ?response, "simulated TOS response");

        response.into_result().map_err(SyncError::from)
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
