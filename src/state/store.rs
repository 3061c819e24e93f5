//! State store implementations
//!
//! The file store writes to a temp file and renames it over the target, so a
//! crash mid-write leaves the previous record intact.

use super::types::SyncState;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Persistence seam for [`SyncState`]
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored record, if any
    async fn load(&self) -> Result<Option<SyncState>>;

    /// Store `cursor` as the last committed cursor and return the written record
    async fn save(&self, cursor: Option<String>) -> Result<SyncState>;

    /// Forget the stored record
    async fn reset(&self) -> Result<()>;
}

// ============================================================================
// File Store
// ============================================================================

/// File-backed state store, one JSON record per file
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store for the given path. Nothing is read until `load`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Option<SyncState>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::state(format!(
                    "Failed to read state file {}: {e}",
                    self.path.display()
                )))
            }
        };

        let state = SyncState::from_json(&contents).map_err(|e| {
            Error::state(format!(
                "Failed to parse state file {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(state))
    }

    async fn save(&self, cursor: Option<String>) -> Result<SyncState> {
        let state = SyncState::new(cursor);
        let contents = state
            .to_json_pretty()
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::state(format!("Failed to create state directory: {e}")))?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!(path = %self.path.display(), cursor = ?state.last_cursor, "Saved sync state");
        Ok(state)
    }

    async fn reset(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::state(format!("Failed to remove state file: {e}"))),
        }
    }
}

// ============================================================================
// Memory Store
// ============================================================================

/// In-memory state store. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    state: Arc<RwLock<Option<SyncState>>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `cursor`
    pub fn with_cursor(cursor: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Some(SyncState::new(Some(cursor.into()))))),
        }
    }

    /// Current record
    pub async fn snapshot(&self) -> Option<SyncState> {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Option<SyncState>> {
        Ok(self.snapshot().await)
    }

    async fn save(&self, cursor: Option<String>) -> Result<SyncState> {
        let state = SyncState::new(cursor);
        *self.state.write().await = Some(state.clone());
        Ok(state)
    }

    async fn reset(&self) -> Result<()> {
        *self.state.write().await = None;
        Ok(())
    }
}
