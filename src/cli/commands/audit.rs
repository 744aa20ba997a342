use anyhow::Result;
use tracing::Instrument;

use super::{open_orchestrator, print_json};
use crate::config::HardenerConfig;
use crate::lifecycle::OperationGate;
use crate::telemetry::{generate_correlation_id, lifecycle_span};

pub struct AuditCommand {
    config: HardenerConfig,
}

impl AuditCommand {
    pub fn new(config: HardenerConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<()> {
        let span = lifecycle_span("audit", &generate_correlation_id());
        async {
            let mut gate = OperationGate::open(&self.config.paths.lock_file)?;
            let _guard = gate.acquire()?;

            let mut orchestrator = open_orchestrator(&self.config).await?;
            let report = orchestrator.audit().await?;
            print_json(&report)
        }
        .instrument(span)
        .await
    }
}
