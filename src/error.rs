// ABOUTME: Top-level fixture error with SNAFU pattern.
// ABOUTME: Unifies pipeline, wait, and teardown errors for callers.

use snafu::Snafu;

use crate::exec::ProcessError;
use crate::shutdown::ShutdownError;
use crate::wait::WaitError;

/// Unified error surfaced by `start()` and `stop()`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FixtureError {
    #[snafu(display("startup failed: {source}"))]
    Startup { source: ProcessError },

    #[snafu(display("cluster readiness failed: {source}"))]
    Readiness { source: WaitError },

    #[snafu(display("log collection failed: {source}"))]
    LogCollection { source: std::io::Error },

    #[snafu(display("teardown failed: {source}"))]
    Teardown { source: ShutdownError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureErrorKind {
    /// The external tool exited non-zero or could not be spawned.
    Process,
    /// A conflicting container could not be removed during startup.
    ConflictResolution,
    /// A readiness wait ran out of its timeout budget.
    Timeout,
    /// A health check raised a non-retryable error.
    FatalHealthCheck,
    /// Teardown failed.
    Shutdown,
    /// Log collection I/O failed.
    Io,
}

impl FixtureError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> FixtureErrorKind {
        match self {
            FixtureError::Startup { source } => match source {
                ProcessError::ConflictRemoval { .. } => FixtureErrorKind::ConflictResolution,
                _ => FixtureErrorKind::Process,
            },
            FixtureError::Readiness { source } => match source {
                WaitError::Timeout { .. } => FixtureErrorKind::Timeout,
                WaitError::Fatal { .. } => FixtureErrorKind::FatalHealthCheck,
            },
            FixtureError::LogCollection { .. } => FixtureErrorKind::Io,
            FixtureError::Teardown { .. } => FixtureErrorKind::Shutdown,
        }
    }
}

impl From<WaitError> for FixtureError {
    fn from(source: WaitError) -> Self {
        FixtureError::Readiness { source }
    }
}

impl From<ShutdownError> for FixtureError {
    fn from(source: ShutdownError) -> Self {
        FixtureError::Teardown { source }
    }
}

pub type Result<T> = std::result::Result<T, FixtureError>;
