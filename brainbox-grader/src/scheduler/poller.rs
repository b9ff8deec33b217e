//! Status poller
//!
//! Follows a submitted judge job until it reaches a terminal status.
//! Bounded by an attempt budget with a fixed interval between attempts, and
//! cancellable: once the token fires no further requests are issued and the
//! pending sleep is dropped.

use brainbox_core::domain::judge::{JobHandle, JudgeStatus};
use brainbox_judge::Judge;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default number of status fetches before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;

/// Default delay between status fetches
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Default limit on a single status fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry budget for one polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status fetches, failed fetches included
    pub max_attempts: u32,
    /// Fixed delay between fetches
    pub interval: Duration,
    /// A fetch still pending after this long counts as a failed attempt
    pub fetch_timeout: Duration,
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Overrides the per-fetch time limit
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Upper bound on the time one polling loop can take
    pub fn time_budget(&self) -> Duration {
        self.fetch_timeout * self.max_attempts
            + self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INTERVAL)
    }
}

/// Reasons polling stopped without a terminal status
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PollError {
    /// Every attempt was used without reaching a terminal status
    #[error("judge did not finish after {attempts} status checks")]
    Timeout {
        attempts: u32,
        /// Last fetch error seen, if any attempt failed
        last_error: Option<String>,
    },

    /// The caller cancelled the loop
    #[error("polling cancelled")]
    Cancelled,
}

/// Polls a judge job until completion
pub struct StatusPoller {
    judge: Arc<dyn Judge>,
}

impl StatusPoller {
    /// Creates a new status poller
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self { judge }
    }

    /// Polls `handle` until a terminal status, budget exhaustion or cancellation
    ///
    /// A fetch error consumes one attempt rather than aborting the loop.
    /// A terminal status is returned as soon as it is seen.
    pub async fn poll(
        &self,
        handle: &JobHandle,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<JudgeStatus, PollError> {
        debug!(
            "Polling {} (attempts: {}, interval: {:?}, budget: {:?})",
            handle.status_url,
            policy.max_attempts,
            policy.interval,
            policy.time_budget()
        );

        let mut last_error = None;

        for attempt in 1..=policy.max_attempts {
            if cancel.is_cancelled() {
                info!("Polling of {} cancelled", handle.status_url);
                return Err(PollError::Cancelled);
            }

            let request = time::timeout(policy.fetch_timeout, self.judge.status(handle));
            let fetched = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Polling of {} cancelled mid-request", handle.status_url);
                    return Err(PollError::Cancelled);
                }
                fetched = request => fetched,
            };

            match fetched {
                Ok(Ok(status)) if status.is_terminal() => {
                    info!(
                        "Judge job {} {} after {} attempt(s)",
                        handle.status_url,
                        status.name(),
                        attempt
                    );
                    return Ok(status);
                }
                Ok(Ok(status)) => {
                    debug!(
                        "Attempt {}/{}: job still {}",
                        attempt,
                        policy.max_attempts,
                        status.name()
                    );
                }
                Ok(Err(e)) => {
                    warn!(
                        "Attempt {}/{}: status fetch failed: {}",
                        attempt, policy.max_attempts, e
                    );
                    last_error = Some(e.to_string());
                }
                Err(_) => {
                    warn!(
                        "Attempt {}/{}: status fetch timed out after {:?}",
                        attempt, policy.max_attempts, policy.fetch_timeout
                    );
                    last_error = Some(format!(
                        "status check timed out after {:?}",
                        policy.fetch_timeout
                    ));
                }
            }

            if attempt < policy.max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Polling of {} cancelled while waiting", handle.status_url);
                        return Err(PollError::Cancelled);
                    }
                    _ = time::sleep(policy.interval) => {}
                }
            }
        }

        warn!(
            "Gave up on {} after {} attempts",
            handle.status_url, policy.max_attempts
        );

        Err(PollError::Timeout {
            attempts: policy.max_attempts,
            last_error,
        })
    }
}
