pub mod audit;
pub mod harden;
pub mod hooks;
pub mod install;
pub mod results;
pub mod status;

use anyhow::Result;
use serde::Serialize;

use crate::config::HardenerConfig;
use crate::external::{AptInstaller, ProcessCommandExecutor, UsgTool};
use crate::lifecycle::{JsonFileStateStore, Orchestrator, OrchestratorSettings};

pub use audit::AuditCommand;
pub use harden::HardenCommand;
pub use hooks::{ConfigChangedCommand, StartCommand};
pub use install::InstallCommand;
pub use results::GetResultsCommand;
pub use status::GetStatusCommand;

/// Orchestrator wired to the real host: JSON state file, `usg`, apt
pub type HostOrchestrator = Orchestrator<
    JsonFileStateStore,
    UsgTool<ProcessCommandExecutor>,
    AptInstaller<ProcessCommandExecutor>,
    ProcessCommandExecutor,
>;

pub async fn open_orchestrator(config: &HardenerConfig) -> Result<HostOrchestrator> {
    let executor = ProcessCommandExecutor::with_timeout(config.tool.timeout());
    let orchestrator = Orchestrator::load(
        OrchestratorSettings::from_config(config),
        JsonFileStateStore::new(&config.paths.state_file),
        UsgTool::new(config.tool.binary.clone(), executor.clone()),
        // Package installation is never cut short
        AptInstaller::new(ProcessCommandExecutor::new()),
        executor,
    )
    .await?;
    Ok(orchestrator)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
