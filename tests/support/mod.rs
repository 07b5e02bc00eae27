// ABOUTME: Shared test support: a scripted fake process executor.
// ABOUTME: Responses queue per operation; the final response is sticky.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use quayside::connection::{Cluster, ContainerCache};
use quayside::exec::{
    BaseInvoker, ComposeCommand, ComposeInvoker, Op, ProcessError, ProcessExecutor, ProcessOutput,
};

/// Fake executor driven by pre-scripted responses.
///
/// Each operation has its own response queue; once only one response
/// remains it repeats for every further call. Operations with no script
/// succeed with empty output. Every call is recorded for assertions.
pub struct ScriptedExecutor {
    responses: Mutex<HashMap<Op, VecDeque<ProcessOutput>>>,
    calls: Mutex<Vec<ComposeCommand>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, op: Op, output: ProcessOutput) {
        self.responses.lock().entry(op).or_default().push_back(output);
    }

    /// All commands executed so far, in order.
    pub fn calls(&self) -> Vec<ComposeCommand> {
        self.calls.lock().clone()
    }

    /// The operations executed so far, in order.
    pub fn ops(&self) -> Vec<Op> {
        self.calls.lock().iter().map(|c| c.op).collect()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().iter().filter(|c| c.op == op).count()
    }
}

#[async_trait]
impl ProcessExecutor for ScriptedExecutor {
    async fn execute(&self, command: &ComposeCommand) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().push(command.clone());

        let mut responses = self.responses.lock();
        let output = match responses.get_mut(&command.op) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(output.unwrap_or_else(|| ProcessOutput::ok("")))
    }
}

/// A cluster wired straight to a scripted executor, no decorators.
pub fn test_cluster(executor: Arc<ScriptedExecutor>) -> Cluster {
    let invoker: Arc<dyn ComposeInvoker> = Arc::new(BaseInvoker::new(executor));
    let cache = Arc::new(ContainerCache::new(invoker, "127.0.0.1"));
    Cluster::new("127.0.0.1", cache)
}

pub fn test_cluster_default() -> Cluster {
    test_cluster(Arc::new(ScriptedExecutor::new()))
}
