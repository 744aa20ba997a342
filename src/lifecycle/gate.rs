//! Cross-process gate: one mutating lifecycle operation in flight per host

use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use super::errors::LifecycleError;

pub struct OperationGate {
    path: PathBuf,
    lock: RwLock<File>,
}

impl OperationGate {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LifecycleError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LifecycleError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| LifecycleError::io(&path, e))?;

        Ok(Self {
            path,
            lock: RwLock::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks until no other invocation holds the gate
    pub fn acquire(&mut self) -> Result<RwLockWriteGuard<'_, File>, LifecycleError> {
        if self.lock.try_write().is_err() {
            tracing::info!(lock = ?self.path, "Another lifecycle operation is running, waiting for it to finish");
        }

        self.lock
            .write()
            .map_err(|e| LifecycleError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_holder_is_excluded_while_first_holds() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run/operation.lock");

        let mut first = OperationGate::open(&path).unwrap();
        let mut second = OperationGate::open(&path).unwrap();

        let guard = first.acquire().unwrap();
        assert!(second.lock.try_write().is_err());
        drop(guard);

        assert!(second.acquire().is_ok());
    }
}
