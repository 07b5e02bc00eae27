// ABOUTME: A health check bound to a timeout, polled until resolution.
// ABOUTME: Success returns, Error aborts, Failure retries on a fixed interval.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::error::WaitError;
use super::healthcheck::{HealthCheck, HealthCheckResult};
use crate::connection::Cluster;

/// Fixed sleep between polling attempts.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One health check with a timeout budget. Stateless across invocations.
#[derive(Clone)]
pub struct ClusterWait {
    check: Arc<dyn HealthCheck<Cluster>>,
    timeout: Duration,
}

impl ClusterWait {
    pub fn new(check: impl HealthCheck<Cluster> + 'static, timeout: Duration) -> Self {
        Self {
            check: Arc::new(check),
            timeout,
        }
    }

    pub fn from_arc(check: Arc<dyn HealthCheck<Cluster>>, timeout: Duration) -> Self {
        Self { check, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll the check against the cluster until it succeeds, raises a fatal
    /// error, or the wall-clock budget is spent.
    ///
    /// Timeout enforcement is purely elapsed-time comparison; the check is
    /// always given at least one attempt.
    pub async fn wait_until_ready(&self, cluster: &Cluster) -> Result<(), WaitError> {
        let started = Instant::now();
        loop {
            match self.check.healthy(cluster).await {
                HealthCheckResult::Success => {
                    debug!(
                        check = self.check.name(),
                        elapsed = ?started.elapsed(),
                        "check succeeded"
                    );
                    return Ok(());
                }
                HealthCheckResult::Error(cause) => {
                    return Err(WaitError::Fatal {
                        check: self.check.name().to_string(),
                        cause,
                    });
                }
                HealthCheckResult::Failure(reason) => {
                    if started.elapsed() >= self.timeout {
                        return Err(WaitError::Timeout {
                            check: self.check.name().to_string(),
                            timeout: self.timeout,
                            last_failure: reason,
                        });
                    }
                    debug!(check = self.check.name(), %reason, "check not ready yet");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }
}
