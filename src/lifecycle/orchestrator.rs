// Lifecycle orchestrator: install -> pre-script -> harden -> audit -> results
//
// Every mutation of the lifecycle record is persisted before the method
// returns. Preconditions are checked before anything is written.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::errors::LifecycleError;
use super::prescript::PreScriptRunner;
use super::readiness::{ReadinessState, StatusSnapshot};
use super::score::parse_audit_score;
use super::store::StateStore;
use super::tailoring::{decode, materialize};
use super::types::*;
use crate::config::{HardenerConfig, UnitConfig};
use crate::external::{
    CommandError, CommandExecutor, HardeningTool, PackageInstaller, ToolError,
};

pub const HARDEN_COMPLETE: &str = "Complete! Please reboot the unit";
pub const AUDIT_COMPLETE: &str = "Audit completed";

/// Static inputs the orchestrator needs besides its collaborators
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub unit: UnitConfig,
    pub package: String,
    pub shell: String,
    pub results: ResultPaths,
}

impl OrchestratorSettings {
    pub fn from_config(config: &HardenerConfig) -> Self {
        Self {
            unit: config.unit.clone(),
            package: config.tool.package.clone(),
            shell: config.tool.shell.clone(),
            results: config.paths.result_paths(),
        }
    }
}

pub struct Orchestrator<S, T, I, E>
where
    S: StateStore,
    T: HardeningTool,
    I: PackageInstaller,
    E: CommandExecutor + Clone,
{
    unit: UnitConfig,
    package: String,
    results: ResultPaths,
    store: S,
    state: LifecycleState,
    tool: T,
    installer: I,
    executor: E,
    scripts: PreScriptRunner<E>,
}

impl<S, T, I, E> Orchestrator<S, T, I, E>
where
    S: StateStore,
    T: HardeningTool,
    I: PackageInstaller,
    E: CommandExecutor + Clone,
{
    /// Read the persisted record, creating the default one on first activation
    pub async fn load(
        settings: OrchestratorSettings,
        store: S,
        tool: T,
        installer: I,
        executor: E,
    ) -> Result<Self, LifecycleError> {
        let state = match store.load().await? {
            Some(state) => state,
            None => {
                let state = LifecycleState::default();
                store.save(&state).await?;
                info!("Initialized lifecycle state");
                state
            }
        };

        Ok(Self {
            unit: settings.unit,
            package: settings.package,
            results: settings.results,
            store,
            state,
            tool,
            installer,
            scripts: PreScriptRunner::new(settings.shell, executor.clone()),
            executor,
        })
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn readiness(&self) -> ReadinessState {
        ReadinessState::derive(&self.state, &self.unit)
    }

    /// Install the hardening engine, then harden if `auto-harden` is set
    pub async fn install(&mut self) -> Result<InstallReport, LifecycleError> {
        info!(package = %self.package, "Installing hardening engine");

        if let Err(e) = self.installer.install(&self.package).await {
            error!(package = %self.package, error = ?e, "Installation failed");
            let reason = format!("Install failed: {e}");
            let err = LifecycleError::InstallFailed {
                package: self.package.clone(),
            };
            return self.fail_with_reason(FailureStep::Install, reason, err).await;
        }

        if matches!(&self.state.last_failure, Some(f) if f.step == FailureStep::Install) {
            self.state.last_failure = None;
            self.persist().await?;
        }

        let harden = if self.unit.auto_harden {
            info!("Auto-hardening enabled, starting hardening");
            Some(self.harden().await?)
        } else {
            info!(status = %self.readiness(), "Installation complete");
            None
        };

        Ok(InstallReport {
            package: self.package.clone(),
            harden,
        })
    }

    /// Reload kernel parameters written by a previous hardening run
    pub async fn start(&self) -> ReadinessState {
        match self.executor.execute("sysctl", &["--system"]).await {
            Ok(output) if output.success() => debug!(output = %output.stdout, "sysctl settings reloaded"),
            Ok(output) => warn!(
                code = output.status_code,
                stderr = %output.stderr,
                "sysctl --system exited with an error"
            ),
            Err(e) => warn!(error = %e, "sysctl --system could not be run"),
        }
        self.config_changed()
    }

    pub fn config_changed(&self) -> ReadinessState {
        let readiness = self.readiness();
        if readiness.is_blocked() {
            warn!(status = %readiness, "Unit is blocked");
        } else {
            info!(status = %readiness, "Unit status");
        }
        readiness
    }

    pub async fn harden(&mut self) -> Result<HardenReport, LifecycleError> {
        let tailoring = self.checked_tailoring()?;

        self.state.begin_harden();
        self.persist().await?;

        if let Some(script) = self.unit.pre_hardening_script().map(str::to_owned) {
            info!("Executing pre-hardening script");
            let outcome = self.scripts.run(&script).await;
            if !outcome.success() {
                let err = LifecycleError::PreScriptFailed {
                    exit_code: outcome.exit_code,
                };
                return self.fail(FailureStep::PreHardeningScript, err).await;
            }
        }

        let tailoring_file = match materialize(&tailoring) {
            Ok(file) => file,
            Err(e) => return self.fail(FailureStep::Harden, e).await,
        };

        info!("Executing hardening");
        let result = self.tool.run_fix(tailoring_file.path()).await;
        drop(tailoring_file);

        match result {
            Err(ToolError::Command(CommandError::Timeout { timeout_ms })) => {
                error!(timeout_ms, "Hardening timed out");
                warn!(status = %self.readiness(), "Hardening was cut short; the unit may be partially hardened");
                return Err(LifecycleError::Timeout {
                    operation: "harden",
                    seconds: timeout_ms / 1000,
                });
            }
            Err(e) => {
                log_tool_failure("Hardening", &e);
                return self.fail(FailureStep::Harden, LifecycleError::HardenFailed).await;
            }
            // The engine is silent on success; any output means some rule failed
            Ok(output) if !output.is_silent() => {
                error!(output = %output.stdout, stderr = %output.stderr, "Hardening reported problems");
                return self.fail(FailureStep::Harden, LifecycleError::HardenFailed).await;
            }
            Ok(output) => {
                if !output.stderr.is_empty() {
                    debug!(stderr = %output.stderr, "Hardening stderr");
                }
            }
        }

        let now = Utc::now();
        self.state.record_harden(now);
        self.persist().await?;
        info!("Hardening complete. Please reboot the unit");

        Ok(HardenReport {
            result: HARDEN_COMPLETE.to_string(),
            reboot_required: true,
            hardened_at: now,
        })
    }

    pub async fn audit(&mut self) -> Result<AuditReport, LifecycleError> {
        let tailoring = self.checked_tailoring()?;

        self.state.begin_audit();
        self.persist().await?;

        let tailoring_file = match materialize(&tailoring) {
            Ok(file) => file,
            Err(e) => return self.fail(FailureStep::Audit, e).await,
        };

        info!(xml = ?self.results.xml, html = ?self.results.html, "Executing audit");
        let result = self
            .tool
            .run_audit(tailoring_file.path(), &self.results.xml, &self.results.html)
            .await;
        drop(tailoring_file);

        match result {
            Err(ToolError::Command(CommandError::Timeout { timeout_ms })) => {
                error!(timeout_ms, "Audit timed out");
                warn!(status = %self.readiness(), "Audit was cut short; no results were recorded");
                return Err(LifecycleError::Timeout {
                    operation: "audit",
                    seconds: timeout_ms / 1000,
                });
            }
            Err(e) => {
                log_tool_failure("Audit", &e);
                return self.fail(FailureStep::Audit, LifecycleError::AuditFailed).await;
            }
            Ok(output) => debug!(output = %output.stdout, "Audit output"),
        }

        let score = parse_audit_score(&self.results.xml).await;
        let now = Utc::now();
        self.state
            .record_audit(now, self.results.to_vec(), score.clone());
        self.persist().await?;
        info!(score = ?score, html = ?self.results.html, "Audit finished");

        Ok(AuditReport {
            result: AUDIT_COMPLETE.to_string(),
            xml_file: self.results.xml.clone(),
            html_file: self.results.html.clone(),
            score,
            audited_at: now,
        })
    }

    pub fn get_status(&self) -> StatusSnapshot {
        let readiness = self.config_changed();
        StatusSnapshot::new(&self.state, &readiness)
    }

    /// Full content of one audit report, base64 encoded
    pub async fn get_results(&self, format: &str) -> Result<String, LifecycleError> {
        if !self.state.audited {
            return Err(LifecycleError::NoAuditYet);
        }
        if self.state.last_audit_files.is_empty() {
            return Err(LifecycleError::ResultsUnavailable);
        }

        let format: ResultFormat = format.parse()?;
        let path = self.results.resolve(format);
        if !self.state.last_audit_files.iter().any(|file| file == path) {
            error!(format = %format, path = ?path, "Result file not recorded by the last audit");
            return Err(LifecycleError::ResultsUnavailable);
        }

        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(path = ?path, "Result file no longer exists");
                return Err(LifecycleError::ResultsUnavailable);
            }
            Err(e) => return Err(LifecycleError::io(path, e)),
        };

        debug!(format = %format, bytes = content.len(), "Returning audit results");
        Ok(STANDARD.encode(content))
    }

    /// Configuration checks that must pass before anything runs or is written
    fn checked_tailoring(&self) -> Result<Vec<u8>, LifecycleError> {
        let encoded = self.unit.tailoring().inspect_err(|_| {
            error!("Tailoring-file is not set");
        })?;
        decode(encoded).inspect_err(|e| {
            error!(error = ?e, "Tailoring-file is not valid base64");
        })
    }

    async fn persist(&self) -> Result<(), LifecycleError> {
        self.store.save(&self.state).await?;
        Ok(())
    }

    async fn fail<R>(&mut self, step: FailureStep, err: LifecycleError) -> Result<R, LifecycleError> {
        let reason = err.to_string();
        self.fail_with_reason(step, reason, err).await
    }

    async fn fail_with_reason<R>(
        &mut self,
        step: FailureStep,
        reason: String,
        err: LifecycleError,
    ) -> Result<R, LifecycleError> {
        self.state.record_failure(step, reason);
        self.persist().await?;
        Err(err)
    }
}

fn log_tool_failure(operation: &str, err: &ToolError) {
    match err {
        ToolError::NonZeroExit {
            code,
            stdout,
            stderr,
            ..
        } => error!(
            operation,
            code,
            stdout = %stdout,
            stderr = %stderr,
            "Hardening engine exited with an error"
        ),
        ToolError::Command(e) => error!(operation, error = %e, "Hardening engine could not be run"),
    }
}
