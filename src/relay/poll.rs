//! Bounded polling of a run until it leaves the queue.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::RelayError;
use crate::gateway::AgentGateway;
use crate::types::Run;

/// How often, and for how long, to poll a pending run.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Wait between two polls.
    pub interval: Duration,
    /// Maximum number of polls after the run was started. `None` is unbounded.
    pub max_attempts: Option<u32>,
    /// Wall-clock budget for the whole loop. `None` is unbounded.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: Some(300),
            timeout: None,
        }
    }
}

impl PollPolicy {
    fn is_exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
            || self.timeout.is_some_and(|limit| elapsed >= limit)
    }
}

/// Poll `run` until its status is no longer queued or in progress.
///
/// Returns as soon as a single poll reports a settled status. Cancelling
/// `cancel` stops the loop; the remote run keeps going on its own.
pub async fn wait_for_run(
    gateway: &dyn AgentGateway,
    thread_id: &str,
    mut run: Run,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<Run, RelayError> {
    let started = Instant::now();
    let mut attempts = 0u32;

    while run.status.is_pending() {
        if policy.is_exhausted(attempts, started.elapsed()) {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            warn!(run_id = %run.id, status = %run.status, attempts, elapsed_ms, "Run did not settle in time");
            return Err(RelayError::RunTimeout {
                run_id: run.id,
                status: run.status,
                attempts,
                elapsed_ms,
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(run_id = %run.id, "Polling cancelled");
                return Err(RelayError::Cancelled);
            }
            _ = tokio::time::sleep(policy.interval) => {}
        }

        attempts += 1;
        let run_id = run.id.clone();
        run = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(run_id = %run_id, "Polling cancelled");
                return Err(RelayError::Cancelled);
            }
            polled = gateway.poll_run(thread_id, &run_id) => polled.map_err(|e| {
                warn!(run_id = %run_id, error = %e, "Failed to poll agent run");
                e
            })?,
        };
        debug!(run_id = %run.id, status = %run.status, attempt = attempts, "Polled run");
    }

    Ok(run)
}
