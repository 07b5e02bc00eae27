// ABOUTME: Default process executor spawning the docker binary.
// ABOUTME: Maps logical operations onto docker compose command lines.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use super::error::ProcessError;
use super::executor::{ComposeCommand, Op, ProcessExecutor, ProcessOutput};
use crate::types::ProjectName;

/// Executor that shells out to `docker` / `docker compose`.
///
/// All flag-level knowledge of the tool is quarantined here so the rest of
/// the pipeline and any test double only ever see logical operations.
pub struct ShellExecutor {
    binary: String,
    project: ProjectName,
    files: Vec<PathBuf>,
}

impl ShellExecutor {
    pub fn new(project: &ProjectName, files: &[PathBuf]) -> Self {
        Self {
            binary: "docker".to_string(),
            project: project.clone(),
            files: files.to_vec(),
        }
    }

    /// Override the binary, e.g. for a podman-compatible wrapper.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn compose_prefix(&self) -> Vec<String> {
        let mut args = vec!["compose".to_string(), "-p".to_string(), self.project.to_string()];
        for file in &self.files {
            args.push("-f".to_string());
            args.push(file.display().to_string());
        }
        args
    }

    /// The default container name compose gives the first replica of a
    /// service within this project.
    fn container_for(&self, service: &str) -> String {
        format!("{}-{}-1", self.project, service)
    }

    fn command_line(&self, command: &ComposeCommand) -> Vec<String> {
        let mut args = match command.op {
            // Plain docker commands addressing a single container.
            Op::Rm => vec!["rm".to_string(), "--force".to_string()],
            Op::Port => {
                let mut v = vec!["port".to_string()];
                if let Some(service) = command.args.first() {
                    v.push(self.container_for(service));
                }
                return v;
            }

            // Everything else goes through compose.
            op => {
                let mut v = self.compose_prefix();
                v.push(op.as_str().to_string());
                match op {
                    Op::Up => v.push("-d".to_string()),
                    Op::Down => {
                        v.push("--volumes".to_string());
                        v.push("--remove-orphans".to_string());
                    }
                    Op::Logs => v.push("--no-color".to_string()),
                    Op::Ps => {
                        // Without --all, compose v2 drops exited containers
                        // from the listing entirely.
                        v.push("--all".to_string());
                        v.push("--format".to_string());
                        v.push("{{.Service}} {{.State}} {{.Health}}".to_string());
                    }
                    _ => {}
                }
                v
            }
        };

        args.extend(command.args.iter().cloned());
        args
    }
}

#[async_trait]
impl ProcessExecutor for ShellExecutor {
    async fn execute(&self, command: &ComposeCommand) -> Result<ProcessOutput, ProcessError> {
        let args = self.command_line(command);
        tracing::debug!(binary = %self.binary, ?args, "executing");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                command: command.display(),
                source,
            })?;

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
