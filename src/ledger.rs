//! Time-entry ledger.
//!
//! When a timer stops, the finished duration is recorded against its task.
//! The engine never sees this; the foreground controller hands the entry to
//! a [`TaskLedger`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Default file name of the ledger inside the data directory.
pub const LEDGER_FILE_NAME: &str = "time_entries.jsonl";

/// One recorded stretch of work on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub task_id: String,
    #[serde(default)]
    pub task_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Counted seconds, excluding paused intervals
    pub seconds: u64,
    /// Epoch milliseconds at which the timer stopped
    pub recorded_at: i64,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode time entry: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Receives finished time entries.
#[allow(async_fn_in_trait)]
pub trait TaskLedger {
    /// Appends `entry`.
    async fn record(&self, entry: &TimeEntry) -> Result<(), LedgerError>;
    /// Returns every recorded entry, oldest first.
    async fn entries(&self) -> Result<Vec<TimeEntry>, LedgerError>;
}

impl<T: TaskLedger> TaskLedger for Arc<T> {
    async fn record(&self, entry: &TimeEntry) -> Result<(), LedgerError> {
        (**self).record(entry).await
    }

    async fn entries(&self) -> Result<Vec<TimeEntry>, LedgerError> {
        (**self).entries().await
    }
}

// ============================================================================
// JsonlTaskLedger
// ============================================================================

/// Appends entries as JSON lines.
///
/// Lines that fail to parse are skipped with a warning so one damaged line
/// does not hide the rest of the history.
#[derive(Debug, Clone)]
pub struct JsonlTaskLedger {
    path: PathBuf,
}

impl JsonlTaskLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(LEDGER_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TaskLedger for JsonlTaskLedger {
    async fn record(&self, entry: &TimeEntry) -> Result<(), LedgerError> {
        let mut line = serde_json::to_vec(entry).map_err(LedgerError::Encode)?;
        line.push(b'\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(&line).await.map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;

        debug!("Recorded {}s for task {}", entry.seconds, entry.task_id);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<TimeEntry>, LedgerError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        Ok(text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping malformed ledger line {}: {}", n + 1, e);
                    None
                }
            })
            .collect())
    }
}

// ============================================================================
// MockTaskLedger
// ============================================================================

#[derive(Debug, Default)]
pub struct MockTaskLedger {
    entries: Mutex<Vec<TimeEntry>>,
    should_fail: AtomicBool,
}

impl MockTaskLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn recorded(&self) -> Vec<TimeEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl TaskLedger for MockTaskLedger {
    async fn record(&self, entry: &TimeEntry) -> Result<(), LedgerError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("Mock failure".to_string()));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<TimeEntry>, LedgerError> {
        Ok(self.recorded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(task_id: &str, seconds: u64) -> TimeEntry {
        TimeEntry {
            task_id: task_id.to_string(),
            task_name: "Review".to_string(),
            project_id: None,
            seconds,
            recorded_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_missing_file_has_no_entries() {
        let dir = TempDir::new().unwrap();
        let ledger = JsonlTaskLedger::in_dir(dir.path());
        assert!(ledger.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_appends() {
        let dir = TempDir::new().unwrap();
        let ledger = JsonlTaskLedger::in_dir(&dir.path().join("nested"));

        ledger.record(&entry("a", 10)).await.unwrap();
        ledger.record(&entry("b", 20)).await.unwrap();

        assert_eq!(
            ledger.entries().await.unwrap(),
            vec![entry("a", 10), entry("b", 20)]
        );
        let text = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"taskId\":\"a\""));
        assert!(text.contains("\"recordedAt\""));
    }

    #[tokio::test]
    async fn test_malformed_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let ledger = JsonlTaskLedger::in_dir(dir.path());
        ledger.record(&entry("a", 1)).await.unwrap();

        let mut text = std::fs::read_to_string(ledger.path()).unwrap();
        text.push_str("not json\n\n");
        std::fs::write(ledger.path(), text).unwrap();
        ledger.record(&entry("b", 2)).await.unwrap();

        let entries = ledger.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].task_id, "b");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let ledger = MockTaskLedger::new();
        ledger.set_should_fail(true);
        assert!(ledger.record(&entry("a", 1)).await.is_err());
        assert!(ledger.recorded().is_empty());
    }
}
