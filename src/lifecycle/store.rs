use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use super::types::LifecycleState;

/// Errors that can occur during state persistence operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage port for the lifecycle record: read on start, write on mutate
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<Option<LifecycleState>, StoreError>;

    async fn save(&self, state: &LifecycleState) -> Result<(), StoreError>;
}

/// Pretty-printed JSON file on local disk
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn load(&self) -> Result<Option<LifecycleState>, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(file = ?self.path, "No existing state file found");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let state: LifecycleState = serde_json::from_str(&contents)?;
        debug!(file = ?self.path, hardened = state.hardened, audited = state.audited, "State loaded");
        Ok(Some(state))
    }

    async fn save(&self, state: &LifecycleState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
        }

        let serialized = serde_json::to_string_pretty(state)?;

        // Write to temporary file first, then rename (atomic operation)
        let temp_file = PathBuf::from(format!("{}.tmp", self.path.display()));
        fs::write(&temp_file, serialized)
            .await
            .map_err(|e| self.io_error(e))?;
        fs::rename(&temp_file, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(file = ?self.path, "State saved");
        Ok(())
    }
}

/// Shared in-memory record; clones see the same state
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    inner: Arc<Mutex<Option<LifecycleState>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LifecycleState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(state))),
        }
    }

    /// Last saved record, if any
    pub fn snapshot(&self) -> Option<LifecycleState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self) -> Result<Option<LifecycleState>, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, state: &LifecycleState) -> Result<(), StoreError> {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStateStore::new(temp_dir.path().join("state.json"));

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_survives_new_store_instance() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/state.json");

        let state = LifecycleState {
            hardened: true,
            last_harden_time: Some(Utc::now()),
            ..Default::default()
        };
        JsonFileStateStore::new(&path).save(&state).await.unwrap();

        // A fresh instance stands in for a process restart
        let loaded = JsonFileStateStore::new(&path).load().await.unwrap().unwrap();
        assert_eq!(loaded, state);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonFileStateStore::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_in_memory_clones_share_state() {
        let store = InMemoryStateStore::new();
        let other = store.clone();

        store
            .save(&LifecycleState {
                audited: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(other.load().await.unwrap().unwrap().audited);
    }
}
