// ABOUTME: Error types for container and cluster lookups.
// ABOUTME: Distinguishes unknown services from tool query failures.

use thiserror::Error;

use crate::exec::ProcessError;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("no running service named `{0}` in this project")]
    UnknownService(String),

    #[error("service `{service}` has no binding for internal port {port}")]
    UnknownPort { service: String, port: u16 },

    #[error("container query failed: {0}")]
    Query(#[from] ProcessError),
}
