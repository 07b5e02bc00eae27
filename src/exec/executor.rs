// ABOUTME: Process executor collaborator contract.
// ABOUTME: Logical compose operations in, captured output and exit status out.

use async_trait::async_trait;
use std::fmt;

use super::error::ProcessError;

/// Logical operations the pipeline issues against the external tool.
///
/// Flag-level detail of the tool lives in the executor implementation, not
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Pull,
    Build,
    Up,
    Down,
    Kill,
    Stop,
    Exec,
    Run,
    Logs,
    Ps,
    Port,
    Rm,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Pull => "pull",
            Op::Build => "build",
            Op::Up => "up",
            Op::Down => "down",
            Op::Kill => "kill",
            Op::Stop => "stop",
            Op::Exec => "exec",
            Op::Run => "run",
            Op::Logs => "logs",
            Op::Ps => "ps",
            Op::Port => "port",
            Op::Rm => "rm",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One command handed to the executor: an operation plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeCommand {
    pub op: Op,
    pub args: Vec<String>,
}

impl ComposeCommand {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(op: Op, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            op,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable form for error messages.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.op.to_string()
        } else {
            format!("{} {}", self.op, self.args.join(" "))
        }
    }
}

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// A successful run with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// A failed run with the given exit code and stderr.
    pub fn err(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}

/// Collaborator that actually runs the external tool.
///
/// Implementations return `Ok` with captured output even for non-zero exits;
/// classifying the exit status is the invoker's job. `Err` is reserved for
/// process-level failures such as the binary not being found.
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    async fn execute(&self, command: &ComposeCommand) -> Result<ProcessOutput, ProcessError>;
}
