// ABOUTME: Retry decorator for the invocation pipeline.
// ABOUTME: Retries failed up attempts only; everything else delegates.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ProcessError;
use super::invoker::{ComposeInvoker, ExecOptions, RunOptions};
use crate::connection::{PortMappings, ServiceState};

/// Wraps an inner invoker and retries `up` until the configured attempt
/// count is exhausted, then surfaces the last failure.
pub struct RetryingInvoker {
    attempts: u32,
    inner: Arc<dyn ComposeInvoker>,
}

impl RetryingInvoker {
    /// `attempts` is the total number of `up` invocations allowed, minimum 1.
    pub fn new(attempts: u32, inner: Arc<dyn ComposeInvoker>) -> Self {
        Self {
            attempts: attempts.max(1),
            inner,
        }
    }
}

#[async_trait]
impl ComposeInvoker for RetryingInvoker {
    async fn up(&self) -> Result<(), ProcessError> {
        for attempt in 1..self.attempts {
            match self.inner.up().await {
                Ok(()) => {
                    if attempt > 1 {
                        info!(attempt, "`up` succeeded after retry");
                    }
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt, error = %e, "`up` failed, retrying");
                }
            }
        }

        // Final attempt surfaces its failure unchanged.
        self.inner.up().await
    }

    async fn pull(&self) -> Result<(), ProcessError> {
        self.inner.pull().await
    }

    async fn build(&self) -> Result<(), ProcessError> {
        self.inner.build().await
    }

    async fn down(&self) -> Result<(), ProcessError> {
        self.inner.down().await
    }

    async fn kill(&self) -> Result<(), ProcessError> {
        self.inner.kill().await
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        self.inner.stop().await
    }

    async fn exec(
        &self,
        options: &ExecOptions,
        service: &str,
        args: &[String],
    ) -> Result<String, ProcessError> {
        self.inner.exec(options, service, args).await
    }

    async fn run(
        &self,
        options: &RunOptions,
        service: &str,
        args: &[String],
    ) -> Result<String, ProcessError> {
        self.inner.run(options, service, args).await
    }

    async fn logs(&self, service: &str) -> Result<String, ProcessError> {
        self.inner.logs(service).await
    }

    async fn ps(&self) -> Result<Vec<ServiceState>, ProcessError> {
        self.inner.ps().await
    }

    async fn ports(&self, service: &str) -> Result<PortMappings, ProcessError> {
        self.inner.ports(service).await
    }

    async fn rm(&self, container: &str) -> Result<(), ProcessError> {
        self.inner.rm(container).await
    }
}
