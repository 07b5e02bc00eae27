// ABOUTME: Teardown policy applied when the fixture run ends.
// ABOUTME: A closed set of strategies over the invocation pipeline.

use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::exec::{ComposeInvoker, ProcessError};

/// How to tear the cluster down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShutdownStrategy {
    /// Kill every container, then bring the project down removing orphans.
    /// Fast, and fine for throwaway test clusters.
    #[default]
    KillThenDown,

    /// Stop containers with a grace period, then bring the project down.
    Graceful,

    /// Leave the cluster running. Diagnostic use only.
    Skip,
}

#[derive(Debug, Error)]
#[error("{strategy:?} shutdown failed: {source}")]
pub struct ShutdownError {
    pub strategy: ShutdownStrategy,
    #[source]
    pub source: ProcessError,
}

impl ShutdownStrategy {
    /// Run the teardown, returning how long it took.
    pub async fn shutdown(&self, invoker: &dyn ComposeInvoker) -> Result<Duration, ShutdownError> {
        let started = Instant::now();
        self.run(invoker)
            .await
            .map_err(|source| ShutdownError {
                strategy: *self,
                source,
            })?;
        let elapsed = started.elapsed();
        debug!(strategy = ?self, ?elapsed, "shutdown complete");
        Ok(elapsed)
    }

    async fn run(&self, invoker: &dyn ComposeInvoker) -> Result<(), ProcessError> {
        match self {
            ShutdownStrategy::KillThenDown => {
                invoker.kill().await?;
                invoker.down().await
            }
            ShutdownStrategy::Graceful => {
                invoker.stop().await?;
                invoker.down().await
            }
            ShutdownStrategy::Skip => {
                warn!("skipping shutdown; cluster left running for inspection");
                Ok(())
            }
        }
    }
}
