//! JSON file backed timer store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::StoreError;
use super::TimerStore;
use crate::types::TimerSession;

/// Default file name of the session slot inside the data directory.
pub const SESSION_FILE_NAME: &str = "timer_session.json";

/// Stores the session as a single JSON file.
///
/// Writes go to a sibling temporary file that is renamed over the target,
/// so a reader in another process never observes a partial record.
#[derive(Debug, Clone)]
pub struct FileTimerStore {
    path: PathBuf,
}

impl FileTimerStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default file name inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE_NAME))
    }

    /// Returns the session file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TimerStore for FileTimerStore {
    async fn read(&self) -> Result<Option<TimerSession>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let session = serde_json::from_slice(&bytes).map_err(StoreError::Corrupt)?;
        Ok(Some(session))
    }

    async fn write(&self, session: &TimerSession) -> Result<(), StoreError> {
        let json = serde_json::to_vec(session).map_err(StoreError::Encode)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &json)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!("Timer session written to {:?}", self.path);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}
