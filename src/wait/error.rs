// ABOUTME: Error types for readiness waits.
// ABOUTME: Timeout carries the last failure; Fatal is never retried.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaitError {
    /// The check never reached success within its budget.
    #[error("health check `{check}` did not succeed within {timeout:?}; last failure: {last_failure}")]
    Timeout {
        check: String,
        timeout: Duration,
        last_failure: String,
    },

    /// The check itself raised an error; retrying cannot help.
    #[error("health check `{check}` raised a fatal error: {cause}")]
    Fatal { check: String, cause: String },
}
