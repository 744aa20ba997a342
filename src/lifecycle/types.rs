// Core types for the hardening lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::errors::LifecycleError;

/// Durable lifecycle record, persisted after every mutation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LifecycleState {
    pub hardened: bool,
    pub audited: bool,
    pub last_harden_time: Option<DateTime<Utc>>,
    pub last_audit_time: Option<DateTime<Utc>>,
    pub last_audit_result: Option<String>,
    #[serde(default)]
    pub last_audit_files: Vec<PathBuf>,
    #[serde(default)]
    pub last_failure: Option<Failure>,
}

impl LifecycleState {
    /// Stale flags must not survive a hardening attempt.
    pub fn begin_harden(&mut self) {
        self.hardened = false;
        self.audited = false;
    }

    pub fn begin_audit(&mut self) {
        self.audited = false;
    }

    pub fn record_harden(&mut self, at: DateTime<Utc>) {
        self.hardened = true;
        self.last_harden_time = Some(at);
        self.last_failure = None;
    }

    pub fn record_audit(&mut self, at: DateTime<Utc>, files: Vec<PathBuf>, score: Option<String>) {
        self.audited = true;
        self.last_audit_time = Some(at);
        self.last_audit_files = files;
        self.last_audit_result = score;
        self.last_failure = None;
    }

    pub fn record_failure(&mut self, step: FailureStep, reason: impl Into<String>) {
        self.last_failure = Some(Failure {
            step,
            reason: reason.into(),
            at: Utc::now(),
        });
    }
}

/// Lifecycle step that can leave the unit in a failed sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureStep {
    Install,
    PreHardeningScript,
    Harden,
    Audit,
}

impl fmt::Display for FailureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStep::Install => "install",
            FailureStep::PreHardeningScript => "pre-hardening-script",
            FailureStep::Harden => "harden",
            FailureStep::Audit => "audit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub step: FailureStep,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Formats accepted by the results action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultFormat {
    Xml,
    Html,
}

impl FromStr for ResultFormat {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(ResultFormat::Xml),
            "html" => Ok(ResultFormat::Html),
            _ => Err(LifecycleError::InvalidFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultFormat::Xml => f.write_str("xml"),
            ResultFormat::Html => f.write_str("html"),
        }
    }
}

/// Fixed locations of the audit reports; repeated audits overwrite them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPaths {
    pub xml: PathBuf,
    pub html: PathBuf,
}

impl ResultPaths {
    pub fn new(xml: impl Into<PathBuf>, html: impl Into<PathBuf>) -> Self {
        Self {
            xml: xml.into(),
            html: html.into(),
        }
    }

    pub fn resolve(&self, format: ResultFormat) -> &Path {
        match format {
            ResultFormat::Xml => &self.xml,
            ResultFormat::Html => &self.html,
        }
    }

    /// XML first, then HTML
    pub fn to_vec(&self) -> Vec<PathBuf> {
        vec![self.xml.clone(), self.html.clone()]
    }
}

impl Default for ResultPaths {
    fn default() -> Self {
        Self::new("/tmp/audit.results.xml", "/tmp/audit.results.html")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct HardenReport {
    pub result: String,
    pub reboot_required: bool,
    pub hardened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuditReport {
    pub result: String,
    pub xml_file: PathBuf,
    pub html_file: PathBuf,
    pub score: Option<String>,
    pub audited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstallReport {
    pub package: String,
    pub harden: Option<HardenReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_format_parsing() {
        assert_eq!("xml".parse::<ResultFormat>().unwrap(), ResultFormat::Xml);
        assert_eq!("HTML".parse::<ResultFormat>().unwrap(), ResultFormat::Html);
        assert!(matches!(
            "pdf".parse::<ResultFormat>(),
            Err(LifecycleError::InvalidFormat { .. })
        ));
        assert!("".parse::<ResultFormat>().is_err());
    }

    #[test]
    fn test_begin_harden_clears_both_flags() {
        let mut state = LifecycleState {
            hardened: true,
            audited: true,
            ..Default::default()
        };
        state.begin_harden();
        assert!(!state.hardened);
        assert!(!state.audited);
    }

    #[test]
    fn test_record_audit_clears_failure() {
        let mut state = LifecycleState::default();
        state.record_failure(FailureStep::Audit, "Audit failed");
        state.record_audit(Utc::now(), ResultPaths::default().to_vec(), None);

        assert!(state.audited);
        assert!(state.last_failure.is_none());
        assert_eq!(state.last_audit_files.len(), 2);
    }

    #[test]
    fn test_state_serializes_with_kebab_keys() {
        let json = serde_json::to_value(LifecycleState::default()).unwrap();
        assert_eq!(json["hardened"], false);
        assert!(json.get("last-audit-files").is_some());
        assert!(json["last-harden-time"].is_null());
    }

    #[test]
    fn test_state_loads_without_optional_fields() {
        let state: LifecycleState = serde_json::from_str(
            r#"{"hardened":true,"audited":false,"last-harden-time":null,
                "last-audit-time":null,"last-audit-result":null}"#,
        )
        .unwrap();
        assert!(state.hardened);
        assert!(state.last_audit_files.is_empty());
        assert!(state.last_failure.is_none());
    }
}
