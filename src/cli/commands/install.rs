use anyhow::Result;
use tracing::Instrument;

use super::{open_orchestrator, print_json};
use crate::config::HardenerConfig;
use crate::lifecycle::OperationGate;
use crate::telemetry::{generate_correlation_id, lifecycle_span};

pub struct InstallCommand {
    config: HardenerConfig,
}

impl InstallCommand {
    pub fn new(config: HardenerConfig) -> Self {
        Self { config }
    }

    /// Install can harden immediately, so it takes the same gate as harden
    pub async fn execute(&self) -> Result<()> {
        let span = lifecycle_span("install", &generate_correlation_id());
        async {
            let mut gate = OperationGate::open(&self.config.paths.lock_file)?;
            let _guard = gate.acquire()?;

            let mut orchestrator = open_orchestrator(&self.config).await?;
            let report = orchestrator.install().await?;
            print_json(&report)
        }
        .instrument(span)
        .await
    }
}
