//! Tailoring file materialization
//!
//! The tailoring document arrives as base64 text in the unit configuration.
//! It is decoded up front as a precondition. The hardening engine wants a
//! file path, so the decoded bytes are written to a uniquely named temporary
//! file. The returned handle keeps the file alive;
//! the caller holds it for the duration of one engine invocation and the file
//! is removed when the handle drops. Removal errors are ignored.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::Write;
use tempfile::NamedTempFile;

use super::errors::LifecycleError;

/// Decode the configured tailoring blob
///
/// ASCII whitespace anywhere in the value is dropped first, so output of
/// `base64` wrapped at 76 columns is accepted.
pub fn decode(encoded: &str) -> Result<Vec<u8>, LifecycleError> {
    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(LifecycleError::InvalidEncoding)
}

pub fn materialize(decoded: &[u8]) -> Result<NamedTempFile, LifecycleError> {
    let mut file = tempfile::Builder::new()
        .prefix("tailoring-")
        .suffix(".xml")
        .tempfile()
        .map_err(|e| LifecycleError::io(std::env::temp_dir(), e))?;

    file.write_all(decoded)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| LifecycleError::io(file.path(), e))?;

    tracing::debug!(path = ?file.path(), bytes = decoded.len(), "Tailoring file materialized");
    Ok(file)
}
