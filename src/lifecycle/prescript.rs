//! Operator-supplied shell snippet run before hardening
//!
//! Some rules can only be remediated after host-specific preparation, so the
//! snippet runs to completion first. Its result only signals the caller.

use crate::external::CommandExecutor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn not_started() -> Self {
        Self {
            exit_code: 1,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

pub struct PreScriptRunner<E: CommandExecutor> {
    shell: String,
    executor: E,
}

impl<E: CommandExecutor> PreScriptRunner<E> {
    pub fn new(shell: impl Into<String>, executor: E) -> Self {
        Self {
            shell: shell.into(),
            executor,
        }
    }

    pub async fn run(&self, script: &str) -> ScriptOutcome {
        let outcome = match self.executor.execute(&self.shell, &["-c", script]).await {
            Ok(output) => ScriptOutcome {
                exit_code: output.status_code,
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Err(e) => {
                tracing::error!(shell = %self.shell, error = %e, "Pre-hardening script could not be started");
                ScriptOutcome::not_started()
            }
        };

        if !outcome.stdout.is_empty() {
            tracing::info!(output = %outcome.stdout, "Pre-hardening script output");
        }
        if !outcome.stderr.is_empty() {
            tracing::error!(output = %outcome.stderr, "Pre-hardening script error output");
        }
        if outcome.success() {
            tracing::info!("Pre-hardening script executed successfully");
        } else {
            tracing::error!(exit_code = outcome.exit_code, "Pre-hardening script failed");
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{CommandError, CommandOutput, ProcessCommandExecutor};
    use crate::lifecycle::mocks::MockCommandExecutor;

    #[tokio::test]
    async fn test_runs_script_through_shell() {
        let executor = MockCommandExecutor::new();
        let runner = PreScriptRunner::new("/bin/bash", executor.clone());

        let outcome = runner.run("systemctl mask ctrl-alt-del.target").await;

        assert!(outcome.success());
        assert_eq!(
            executor.invocations(),
            vec!["/bin/bash -c systemctl mask ctrl-alt-del.target".to_string()]
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported_with_streams() {
        let executor = MockCommandExecutor::new().respond_to(
            "/bin/bash",
            Ok(CommandOutput {
                status_code: 4,
                stdout: "partial".to_string(),
                stderr: "denied".to_string(),
            }),
        );
        let runner = PreScriptRunner::new("/bin/bash", executor);

        let outcome = runner.run("false").await;

        assert_eq!(outcome.exit_code, 4);
        assert_eq!(outcome.stdout, "partial");
        assert_eq!(outcome.stderr, "denied");
    }

    #[tokio::test]
    async fn test_spawn_failure_maps_to_exit_one_with_empty_streams() {
        let executor = MockCommandExecutor::new().respond_to(
            "/bin/bash",
            Err(CommandError::CommandNotFound {
                command: "/bin/bash".to_string(),
            }),
        );
        let runner = PreScriptRunner::new("/bin/bash", executor);

        assert_eq!(runner.run("true").await, ScriptOutcome::not_started());
    }

    #[tokio::test]
    async fn test_real_shell_captures_both_streams() {
        let runner = PreScriptRunner::new("sh", ProcessCommandExecutor::new());

        let outcome = runner.run("echo out; echo err >&2; exit 7").await;

        assert_eq!(outcome.exit_code, 7);
        assert_eq!(outcome.stdout.trim(), "out");
        assert_eq!(outcome.stderr.trim(), "err");
    }
}
