use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lifecycle::{LifecycleError, ResultPaths};

pub const DEFAULT_CONFIG_FILE: &str = "cis-hardener.toml";
pub const ENV_PREFIX: &str = "CIS_HARDENER";

/// Main configuration structure for the hardener
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HardenerConfig {
    /// Operator-facing unit settings
    pub unit: UnitConfig,
    /// Well-known file locations
    pub paths: PathsConfig,
    /// Hardening engine invocation
    pub tool: ToolConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

/// The three keys the operator sets on the unit
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Base64 encoded tailoring document
    #[serde(rename = "tailoring-file", alias = "tailoring_file")]
    pub tailoring_file: String,
    /// Shell snippet run before hardening
    #[serde(rename = "pre-hardening-script", alias = "pre_hardening_script")]
    pub pre_hardening_script: String,
    /// Harden straight after install
    #[serde(rename = "auto-harden", alias = "auto_harden")]
    pub auto_harden: bool,
}

impl UnitConfig {
    /// The tailoring blob, or `ConfigurationMissing` when blank
    pub fn tailoring(&self) -> Result<&str, LifecycleError> {
        non_blank(&self.tailoring_file).ok_or(LifecycleError::ConfigurationMissing)
    }

    pub fn is_configured(&self) -> bool {
        non_blank(&self.tailoring_file).is_some()
    }

    pub fn pre_hardening_script(&self) -> Option<&str> {
        non_blank(&self.pre_hardening_script)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PathsConfig {
    #[serde(alias = "state_file")]
    pub state_file: PathBuf,
    #[serde(alias = "lock_file")]
    pub lock_file: PathBuf,
    #[serde(alias = "audit_xml")]
    pub audit_xml: PathBuf,
    #[serde(alias = "audit_html")]
    pub audit_html: PathBuf,
}

impl PathsConfig {
    pub fn result_paths(&self) -> ResultPaths {
        ResultPaths::new(&self.audit_xml, &self.audit_html)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let results = ResultPaths::default();
        Self {
            state_file: PathBuf::from("/var/lib/cis-hardener/state.json"),
            lock_file: PathBuf::from("/var/lib/cis-hardener/operation.lock"),
            audit_xml: results.xml,
            audit_html: results.html,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolConfig {
    /// Hardening engine executable
    pub binary: String,
    /// Package providing the engine
    pub package: String,
    /// Shell used for the pre-hardening script
    pub shell: String,
    /// Kill engine runs that exceed this; unset means wait forever
    #[serde(alias = "timeout_seconds", skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl ToolConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            binary: "usg".to_string(),
            package: "usg".to_string(),
            shell: "/bin/bash".to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ObservabilityConfig {
    /// Log level, overridden by RUST_LOG
    #[serde(alias = "log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of plain text
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: true,
        }
    }
}

impl HardenerConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (explicit path, or cis-hardener.toml if present)
    /// 3. Environment variables (CIS_HARDENER__SECTION__KEY)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to read configuration")?;
        let hardener_config: HardenerConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;

        Ok(hardener_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
