use anyhow::Result;

use super::open_orchestrator;
use crate::config::HardenerConfig;

pub struct GetResultsCommand {
    config: HardenerConfig,
    format: String,
}

impl GetResultsCommand {
    pub fn new(config: HardenerConfig, format: impl Into<String>) -> Self {
        Self {
            config,
            format: format.into(),
        }
    }

    /// Prints the report as one opaque base64 line; reports can be large
    pub async fn execute(&self) -> Result<()> {
        let orchestrator = open_orchestrator(&self.config).await?;
        let encoded = orchestrator.get_results(&self.format).await?;
        println!("{encoded}");
        Ok(())
    }
}
