// Mock implementations for testing - no side effects beyond temp files

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::external::{
    CommandError, CommandExecutor, CommandOutput, HardeningTool, InstallError, PackageInstaller,
    ToolError, ToolOutput,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Command executor that records invocations and replays canned responses
///
/// Programs without a canned response succeed silently.
#[derive(Debug, Clone, Default)]
pub struct MockCommandExecutor {
    responses: Arc<Mutex<HashMap<String, Result<CommandOutput, CommandError>>>>,
    invocations: Arc<Mutex<Vec<String>>>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_to(self, program: &str, response: Result<CommandOutput, CommandError>) -> Self {
        lock(&self.responses).insert(program.to_string(), response);
        self
    }

    /// Each invocation as a single space-joined command line
    pub fn invocations(&self) -> Vec<String> {
        lock(&self.invocations).clone()
    }
}

#[async_trait]
impl CommandExecutor for MockCommandExecutor {
    async fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let mut line = vec![program];
        line.extend_from_slice(args);
        lock(&self.invocations).push(line.join(" "));

        lock(&self.responses)
            .get(program)
            .cloned()
            .unwrap_or_else(|| {
                Ok(CommandOutput {
                    status_code: 0,
                    stdout: String::new(),
                    stderr: String::new(),
                })
            })
    }
}

/// What the scripted audit run does with the result paths
#[derive(Debug, Clone)]
pub enum AuditBehavior {
    /// Write this document to the XML path and a stub to the HTML path
    WriteResults(String),
    Fail(ToolError),
}

/// Hardening engine double with scripted responses and call tracking
#[derive(Debug, Clone)]
pub struct ScriptedHardeningTool {
    fix_response: Arc<Mutex<Result<ToolOutput, ToolError>>>,
    audit_behavior: Arc<Mutex<AuditBehavior>>,
    fix_calls: Arc<Mutex<Vec<Vec<u8>>>>,
    audit_calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl Default for ScriptedHardeningTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedHardeningTool {
    pub fn new() -> Self {
        Self {
            fix_response: Arc::new(Mutex::new(Ok(ToolOutput::default()))),
            audit_behavior: Arc::new(Mutex::new(AuditBehavior::WriteResults(
                "<Benchmark><TestResult><score>100</score></TestResult></Benchmark>".to_string(),
            ))),
            fix_calls: Arc::new(Mutex::new(Vec::new())),
            audit_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_fix_response(&self, response: Result<ToolOutput, ToolError>) {
        *lock(&self.fix_response) = response;
    }

    pub fn set_fix_output(&self, stdout: &str) {
        self.set_fix_response(Ok(ToolOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
        }));
    }

    pub fn set_audit_behavior(&self, behavior: AuditBehavior) {
        *lock(&self.audit_behavior) = behavior;
    }

    pub fn fix_call_count(&self) -> usize {
        lock(&self.fix_calls).len()
    }

    /// Tailoring bytes the engine saw on each fix run
    pub fn fix_tailoring_contents(&self) -> Vec<Vec<u8>> {
        lock(&self.fix_calls).clone()
    }

    pub fn audit_call_count(&self) -> usize {
        lock(&self.audit_calls).len()
    }
}

#[async_trait]
impl HardeningTool for ScriptedHardeningTool {
    async fn run_fix(&self, tailoring: &Path) -> Result<ToolOutput, ToolError> {
        let contents = std::fs::read(tailoring).unwrap_or_default();
        lock(&self.fix_calls).push(contents);
        lock(&self.fix_response).clone()
    }

    async fn run_audit(
        &self,
        tailoring: &Path,
        xml_out: &Path,
        html_out: &Path,
    ) -> Result<ToolOutput, ToolError> {
        assert!(tailoring.exists(), "tailoring file must exist during the audit");
        lock(&self.audit_calls).push((xml_out.to_path_buf(), html_out.to_path_buf()));

        let behavior = lock(&self.audit_behavior).clone();
        match behavior {
            AuditBehavior::WriteResults(xml) => {
                std::fs::write(xml_out, xml).map_err(|e| CommandError::Io {
                    message: e.to_string(),
                })?;
                std::fs::write(html_out, "<html><body>report</body></html>").map_err(|e| {
                    CommandError::Io {
                        message: e.to_string(),
                    }
                })?;
                Ok(ToolOutput::default())
            }
            AuditBehavior::Fail(err) => Err(err),
        }
    }
}

/// Package installer double
#[derive(Debug, Clone, Default)]
pub struct ScriptedInstaller {
    failure: Arc<Mutex<Option<InstallError>>>,
    installed: Arc<Mutex<Vec<String>>>,
}

impl ScriptedInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: InstallError) -> Self {
        let installer = Self::default();
        *lock(&installer.failure) = Some(err);
        installer
    }

    pub fn installed(&self) -> Vec<String> {
        lock(&self.installed).clone()
    }
}

#[async_trait]
impl PackageInstaller for ScriptedInstaller {
    async fn install(&self, package: &str) -> Result<(), InstallError> {
        lock(&self.installed).push(package.to_string());
        match lock(&self.failure).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
