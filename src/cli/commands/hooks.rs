use anyhow::Result;
use tracing::Instrument;

use super::open_orchestrator;
use crate::config::HardenerConfig;
use crate::telemetry::{generate_correlation_id, lifecycle_span};

pub struct StartCommand {
    config: HardenerConfig,
}

impl StartCommand {
    pub fn new(config: HardenerConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<()> {
        let span = lifecycle_span("start", &generate_correlation_id());
        async {
            let orchestrator = open_orchestrator(&self.config).await?;
            let readiness = orchestrator.start().await;
            println!("{readiness}");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

pub struct ConfigChangedCommand {
    config: HardenerConfig,
}

impl ConfigChangedCommand {
    pub fn new(config: HardenerConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<()> {
        let span = lifecycle_span("config-changed", &generate_correlation_id());
        async {
            let orchestrator = open_orchestrator(&self.config).await?;
            println!("{}", orchestrator.config_changed());
            Ok(())
        }
        .instrument(span)
        .await
    }
}
