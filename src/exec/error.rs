// ABOUTME: Error types for the invocation pipeline.
// ABOUTME: Covers spawn failures, non-zero exits, and conflict removal.

use thiserror::Error;

/// Errors surfaced by the invocation pipeline.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The external tool could not be spawned at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran but exited non-zero.
    #[error("`{command}` exited with status {code}: {stderr}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// A conflicting container blocking `up` could not be removed.
    #[error("could not remove conflicting container `{container}`: {source}")]
    ConflictRemoval {
        container: String,
        #[source]
        source: Box<ProcessError>,
    },

    /// The external tool produced output the pipeline could not interpret.
    #[error("could not parse `{command}` output: {detail}")]
    UnparseableOutput { command: String, detail: String },
}
