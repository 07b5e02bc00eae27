// ABOUTME: Health check contract and its tri-state result.
// ABOUTME: Success ends polling, Failure retries, Error aborts immediately.

use async_trait::async_trait;

/// Outcome of one health check evaluation.
///
/// The distinction matters to the polling loop: `Failure` is retried until
/// the timeout budget runs out, `Error` is never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthCheckResult {
    Success,
    Failure(String),
    Error(String),
}

impl HealthCheckResult {
    pub fn success() -> Self {
        HealthCheckResult::Success
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        HealthCheckResult::Failure(reason.into())
    }

    pub fn error(cause: impl Into<String>) -> Self {
        HealthCheckResult::Error(cause.into())
    }

    /// Success when `healthy` holds, otherwise a failure with the reason.
    pub fn from_bool(healthy: bool, reason: impl Into<String>) -> Self {
        if healthy {
            HealthCheckResult::Success
        } else {
            HealthCheckResult::Failure(reason.into())
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, HealthCheckResult::Success)
    }
}

/// A predicate over a target (container, container list, or cluster).
///
/// Evaluation may perform I/O and must be safe to invoke repeatedly; the
/// polling loop calls it once per attempt.
#[async_trait]
pub trait HealthCheck<T>: Send + Sync {
    async fn healthy(&self, target: &T) -> HealthCheckResult;

    /// Label used in failure reporting only, never for identity.
    fn name(&self) -> &str {
        "healthcheck"
    }
}
