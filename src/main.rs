use anyhow::Result;
use clap::Parser;

use cis_hardener::cli::commands::{
    AuditCommand, ConfigChangedCommand, GetResultsCommand, GetStatusCommand, HardenCommand,
    InstallCommand, StartCommand,
};
use cis_hardener::cli::{Cli, Commands};
use cis_hardener::config::HardenerConfig;
use cis_hardener::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    HardenerConfig::load_env_file()?;
    let config = HardenerConfig::load(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;

    // One lifecycle operation per process; no need for a worker pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Install => InstallCommand::new(config).execute().await,
            Commands::Start => StartCommand::new(config).execute().await,
            Commands::ConfigChanged => ConfigChangedCommand::new(config).execute().await,
            Commands::Harden => HardenCommand::new(config).execute().await,
            Commands::Audit => AuditCommand::new(config).execute().await,
            Commands::GetStatus => GetStatusCommand::new(config).execute().await,
            Commands::GetResults { format } => {
                GetResultsCommand::new(config, format).execute().await
            }
        }
    })
}
