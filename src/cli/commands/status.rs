use anyhow::Result;

use super::{open_orchestrator, print_json};
use crate::config::HardenerConfig;

pub struct GetStatusCommand {
    config: HardenerConfig,
}

impl GetStatusCommand {
    pub fn new(config: HardenerConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<()> {
        let orchestrator = open_orchestrator(&self.config).await?;
        print_json(&orchestrator.get_status())
    }
}
