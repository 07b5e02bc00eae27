// ABOUTME: Conflict-removal decorator for the invocation pipeline.
// ABOUTME: Removes name-conflicting containers blocking up, then retries once.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::error::ProcessError;
use super::invoker::{ComposeInvoker, ExecOptions, RunOptions};
use crate::connection::{PortMappings, ServiceState};

/// Signature docker prints when a container name is already taken.
const CONFLICT_MARKER: &str = "Conflict. The container name";

/// Wraps an inner invoker; when `up` fails with a container-name conflict,
/// removes the offending containers and retries `up` exactly once.
pub struct ConflictRemovingInvoker {
    inner: Arc<dyn ComposeInvoker>,
}

impl ConflictRemovingInvoker {
    pub fn new(inner: Arc<dyn ComposeInvoker>) -> Self {
        Self { inner }
    }
}

/// Extract conflicting container names from the tool's error output.
///
/// Lines look like:
/// `Conflict. The container name "/proj-db-1" is already in use by container "abc123" ...`
fn conflicting_container_names(stderr: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in stderr.lines() {
        let Some(idx) = line.find(CONFLICT_MARKER) else {
            continue;
        };
        let rest = &line[idx + CONFLICT_MARKER.len()..];
        let Some(start) = rest.find('"') else {
            continue;
        };
        let rest = &rest[start + 1..];
        let Some(end) = rest.find('"') else {
            continue;
        };
        let name = rest[..end].trim_start_matches('/');
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    names
}

#[async_trait]
impl ComposeInvoker for ConflictRemovingInvoker {
    async fn up(&self) -> Result<(), ProcessError> {
        match self.inner.up().await {
            Ok(()) => Ok(()),
            Err(ProcessError::NonZeroExit {
                command,
                code,
                stderr,
            }) => {
                let names = conflicting_container_names(&stderr);
                if names.is_empty() {
                    return Err(ProcessError::NonZeroExit {
                        command,
                        code,
                        stderr,
                    });
                }

                for name in &names {
                    info!(container = %name, "removing conflicting container");
                    self.inner.rm(name).await.map_err(|source| {
                        ProcessError::ConflictRemoval {
                            container: name.clone(),
                            source: Box::new(source),
                        }
                    })?;
                }

                self.inner.up().await
            }
            Err(e) => Err(e),
        }
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
