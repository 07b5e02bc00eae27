// ABOUTME: Compose invoker trait and its base implementation.
// ABOUTME: Maps logical operations to executor calls and classifies exits.

use async_trait::async_trait;
use std::sync::Arc;

use super::error::ProcessError;
use super::executor::{ComposeCommand, Op, ProcessExecutor, ProcessOutput};
use crate::connection::{PortMappings, ServiceState};

/// Options passed before the service name on `exec`, e.g. `-T`.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions(Vec<String>);

impl ExecOptions {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(options.into_iter().map(Into::into).collect())
    }

    pub fn options(&self) -> &[String] {
        &self.0
    }
}

/// Options passed before the service name on `run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions(Vec<String>);

impl RunOptions {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(options.into_iter().map(Into::into).collect())
    }

    pub fn options(&self) -> &[String] {
        &self.0
    }
}

/// The fixed vocabulary of operations against the external tool.
///
/// Decorators implement this same trait and wrap an inner instance, so the
/// pipeline is assembled by explicit composition.
#[async_trait]
pub trait ComposeInvoker: Send + Sync {
    async fn pull(&self) -> Result<(), ProcessError>;
    async fn build(&self) -> Result<(), ProcessError>;
    async fn up(&self) -> Result<(), ProcessError>;
    async fn down(&self) -> Result<(), ProcessError>;
    async fn kill(&self) -> Result<(), ProcessError>;
    async fn stop(&self) -> Result<(), ProcessError>;

    async fn exec(
        &self,
        options: &ExecOptions,
        service: &str,
        args: &[String],
    ) -> Result<String, ProcessError>;

    async fn run(
        &self,
        options: &RunOptions,
        service: &str,
        args: &[String],
    ) -> Result<String, ProcessError>;

    async fn logs(&self, service: &str) -> Result<String, ProcessError>;

    /// List the project's services with their container states.
    async fn ps(&self) -> Result<Vec<ServiceState>, ProcessError>;

    /// Resolve the port bindings of one service.
    async fn ports(&self, service: &str) -> Result<PortMappings, ProcessError>;

    /// Force-remove a container by name. Used for conflict resolution.
    async fn rm(&self, container: &str) -> Result<(), ProcessError>;
}

/// Base invoker issuing commands through a [`ProcessExecutor`].
pub struct BaseInvoker {
    executor: Arc<dyn ProcessExecutor>,
}

impl BaseInvoker {
    pub fn new(executor: Arc<dyn ProcessExecutor>) -> Self {
        Self { executor }
    }

    async fn call(&self, command: ComposeCommand) -> Result<ProcessOutput, ProcessError> {
        let output = self.executor.execute(&command).await?;
        if !output.success() {
            return Err(ProcessError::NonZeroExit {
                command: command.display(),
                code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    async fn call_unit(&self, op: Op) -> Result<(), ProcessError> {
        self.call(ComposeCommand::new(op)).await.map(|_| ())
    }
}

#[async_trait]
impl ComposeInvoker for BaseInvoker {
    async fn pull(&self) -> Result<(), ProcessError> {
        self.call_unit(Op::Pull).await
    }

    async fn build(&self) -> Result<(), ProcessError> {
        self.call_unit(Op::Build).await
    }

    async fn up(&self) -> Result<(), ProcessError> {
        self.call_unit(Op::Up).await
    }

    async fn down(&self) -> Result<(), ProcessError> {
        self.call_unit(Op::Down).await
    }

    async fn kill(&self) -> Result<(), ProcessError> {
        self.call_unit(Op::Kill).await
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        self.call_unit(Op::Stop).await
    }

    async fn exec(
        &self,
        options: &ExecOptions,
        service: &str,
        args: &[String],
    ) -> Result<String, ProcessError> {
        let mut full = options.options().to_vec();
        full.push(service.to_string());
        full.extend(args.iter().cloned());
        let output = self.call(ComposeCommand::with_args(Op::Exec, full)).await?;
        Ok(output.stdout)
    }

    async fn run(
        &self,
        options: &RunOptions,
        service: &str,
        args: &[String],
    ) -> Result<String, ProcessError> {
        let mut full = options.options().to_vec();
        full.push(service.to_string());
        full.extend(args.iter().cloned());
        let output = self.call(ComposeCommand::with_args(Op::Run, full)).await?;
        Ok(output.stdout)
    }

    async fn logs(&self, service: &str) -> Result<String, ProcessError> {
        let output = self
            .call(ComposeCommand::with_args(Op::Logs, [service]))
            .await?;
        Ok(output.stdout)
    }

    async fn ps(&self) -> Result<Vec<ServiceState>, ProcessError> {
        let command = ComposeCommand::new(Op::Ps);
        let display = command.display();
        let output = self.call(command).await?;
        ServiceState::parse_listing(&output.stdout).map_err(|e| ProcessError::UnparseableOutput {
            command: display,
            detail: e.to_string(),
        })
    }

    async fn ports(&self, service: &str) -> Result<PortMappings, ProcessError> {
        let command = ComposeCommand::with_args(Op::Port, [service]);
        let display = command.display();
        let output = self.call(command).await?;
        PortMappings::parse(&output.stdout).map_err(|e| ProcessError::UnparseableOutput {
            command: display,
            detail: e.to_string(),
        })
    }

    async fn rm(&self, container: &str) -> Result<(), ProcessError> {
        self.call(ComposeCommand::with_args(Op::Rm, [container]))
            .await
            .map(|_| ())
    }
}
