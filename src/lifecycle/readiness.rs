//! Readiness classification and the read-only status projection
//!
//! Readiness is never stored. It is computed from the persisted record and the
//! current configuration every time someone asks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::types::{FailureStep, LifecycleState};
use crate::config::UnitConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    /// No tailoring file configured
    Unconfigured,
    /// Configured, not hardened yet
    Ready,
    /// Hardened, waiting for an audit
    Hardened,
    /// Hardened and audited
    Audited {
        html_file: Option<PathBuf>,
        score: Option<String>,
    },
    /// The last step failed after its preconditions passed
    Failed { step: FailureStep, reason: String },
}

impl ReadinessState {
    pub fn derive(state: &LifecycleState, config: &UnitConfig) -> Self {
        if let Some(failure) = &state.last_failure {
            return ReadinessState::Failed {
                step: failure.step,
                reason: failure.reason.clone(),
            };
        }
        if state.hardened && state.audited {
            return ReadinessState::Audited {
                html_file: state.last_audit_files.get(1).cloned(),
                score: state.last_audit_result.clone(),
            };
        }
        if state.hardened {
            return ReadinessState::Hardened;
        }
        if !config.is_configured() {
            return ReadinessState::Unconfigured;
        }
        ReadinessState::Ready
    }

    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            ReadinessState::Unconfigured | ReadinessState::Failed { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadinessState::Unconfigured => "unconfigured",
            ReadinessState::Ready => "ready",
            ReadinessState::Hardened => "hardened",
            ReadinessState::Audited { .. } => "audited",
            ReadinessState::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessState::Unconfigured => {
                f.write_str("Cannot run hardening. Please configure a tailoring-file")
            }
            ReadinessState::Ready => f.write_str("Ready for CIS hardening. Run 'harden' action"),
            ReadinessState::Hardened => f.write_str(
                "Unit is hardened. Reboot if not done yet, then use 'audit' action to check compliance",
            ),
            ReadinessState::Audited { html_file, score } => {
                f.write_str("Audit finished.")?;
                if let Some(score) = score {
                    write!(f, " Score: {score}.")?;
                }
                if let Some(html) = html_file {
                    write!(f, " Result file: {}", html.display())?;
                }
                Ok(())
            }
            ReadinessState::Failed { step, reason } => write!(f, "{reason} ({step})"),
        }
    }
}

/// Persisted record plus the derived readiness, as returned by `get-status`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StatusSnapshot {
    pub hardened: bool,
    pub last_harden_time: Option<DateTime<Utc>>,
    pub audited: bool,
    pub last_audit_time: Option<DateTime<Utc>>,
    pub last_audit_result: Option<String>,
    pub last_audit_files: Vec<PathBuf>,
    pub state: &'static str,
    pub status: String,
    pub blocked: bool,
}

impl StatusSnapshot {
    pub fn new(state: &LifecycleState, readiness: &ReadinessState) -> Self {
        Self {
            hardened: state.hardened,
            last_harden_time: state.last_harden_time,
            audited: state.audited,
            last_audit_time: state.last_audit_time,
            last_audit_result: state.last_audit_result.clone(),
            last_audit_files: state.last_audit_files.clone(),
            state: readiness.label(),
            status: readiness.to_string(),
            blocked: readiness.is_blocked(),
        }
    }
}
