use std::path::PathBuf;
use thiserror::Error;

use super::store::StoreError;

/// Operator-facing lifecycle failures
///
/// Messages are fixed summaries. Captured child output is logged where the
/// failure happens and never copied into these messages.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Tailoring-file is not set")]
    ConfigurationMissing,

    #[error("Tailoring-file is not valid base64")]
    InvalidEncoding(#[source] base64::DecodeError),

    #[error("Failed to run pre-hardening script (exit code {exit_code}). Check logs")]
    PreScriptFailed { exit_code: i32 },

    #[error("Failed to run CIS hardening. Check logs")]
    HardenFailed,

    #[error("Audit failed. Check logs")]
    AuditFailed,

    #[error("Install failed: could not install {package}")]
    InstallFailed { package: String },

    #[error("No result found. Unit not audited. Run audit action first")]
    NoAuditYet,

    #[error(
        "No result found. Audit result files are missing; they live on transient storage and \
         do not survive a reboot. Re-run the audit action"
    )]
    ResultsUnavailable,

    #[error("Invalid format parameter '{format}'. Must be 'xml' or 'html'")]
    InvalidFormat { format: String },

    #[error("I/O failure on {path}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lifecycle state could not be persisted")]
    Store(#[from] StoreError),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },
}

impl LifecycleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LifecycleError::IoFailure {
            path: path.into(),
            source,
        }
    }

    /// Precondition failures are detected before anything runs and never
    /// touch persisted state.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LifecycleError::ConfigurationMissing
                | LifecycleError::InvalidEncoding(_)
                | LifecycleError::InvalidFormat { .. }
                | LifecycleError::NoAuditYet
                | LifecycleError::ResultsUnavailable
        )
    }
}
