// ABOUTME: Invocation pipeline for the external compose tool.
// ABOUTME: Base invoker wrapped by conflict-removal and retry decorators.

mod conflict;
mod error;
mod executor;
mod invoker;
mod retry;
mod shell;

pub use conflict::ConflictRemovingInvoker;
pub use error::ProcessError;
pub use executor::{ComposeCommand, Op, ProcessExecutor, ProcessOutput};
pub use invoker::{BaseInvoker, ComposeInvoker, ExecOptions, RunOptions};
pub use retry::RetryingInvoker;
pub use shell::ShellExecutor;
