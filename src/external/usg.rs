//! Adapter for the `usg` hardening engine
//!
//! Wraps the engine's `fix` and `audit` subcommands. The adapter only reports
//! what the child did; deciding whether that counts as success is the
//! orchestrator's job. No retries happen here.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use super::command::{CommandError, CommandExecutor};

/// Captured output of a hardening engine run that exited with status 0
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// The engine prints nothing when `fix` succeeds.
    pub fn is_silent(&self) -> bool {
        self.stdout.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{program} {subcommand} exited with code {code}")]
    NonZeroExit {
        program: String,
        subcommand: String,
        code: i32,
        stdout: String,
        stderr: String,
    },
    #[error(transparent)]
    Command(#[from] CommandError),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HardeningTool: Send + Sync {
    /// Apply the rules selected by the tailoring file to the host
    async fn run_fix(&self, tailoring: &Path) -> Result<ToolOutput, ToolError>;

    /// Evaluate the host against the tailoring file, writing both reports
    async fn run_audit(
        &self,
        tailoring: &Path,
        xml_out: &Path,
        html_out: &Path,
    ) -> Result<ToolOutput, ToolError>;
}

/// `usg` invoked as a child process through a [`CommandExecutor`]
pub struct UsgTool<E: CommandExecutor> {
    binary: String,
    executor: E,
}

impl<E: CommandExecutor> UsgTool<E> {
    pub fn new(binary: impl Into<String>, executor: E) -> Self {
        Self {
            binary: binary.into(),
            executor,
        }
    }

    async fn run(&self, subcommand: &str, args: &[String]) -> Result<ToolOutput, ToolError> {
        let mut argv: Vec<&str> = vec![subcommand];
        argv.extend(args.iter().map(String::as_str));

        tracing::debug!(program = %self.binary, args = ?argv, "Invoking hardening engine");
        let output = self.executor.execute(&self.binary, &argv).await?;

        if !output.success() {
            return Err(ToolError::NonZeroExit {
                program: self.binary.clone(),
                subcommand: subcommand.to_string(),
                code: output.status_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl<E: CommandExecutor> HardeningTool for UsgTool<E> {
    async fn run_fix(&self, tailoring: &Path) -> Result<ToolOutput, ToolError> {
        self.run("fix", &["--tailoring-file".to_string(), path_arg(tailoring)])
            .await
    }

    async fn run_audit(
        &self,
        tailoring: &Path,
        xml_out: &Path,
        html_out: &Path,
    ) -> Result<ToolOutput, ToolError> {
        self.run(
            "audit",
            &[
                "--tailoring-file".to_string(),
                path_arg(tailoring),
                "--results-file".to_string(),
                path_arg(xml_out),
                "--html-file".to_string(),
                path_arg(html_out),
            ],
        )
        .await
    }
}
