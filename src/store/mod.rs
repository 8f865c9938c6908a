//! Durable timer store.
//!
//! A single-slot persistence abstraction holding at most one
//! [`TimerSession`]. Absence of the record means the timer is idle.
//!
//! Implementations:
//! - [`FileTimerStore`]: JSON file with atomic replace, readable by any
//!   later process (the background refresh runs in a fresh process)
//! - [`MemoryTimerStore`]: in-process slot with failure injection for tests
//!
//! Callers treat a failed read as "absent" for control flow and log it.

pub mod error;
pub mod file;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use self::error::StoreError;
pub use self::file::{FileTimerStore, SESSION_FILE_NAME};

use crate::types::TimerSession;

/// Single-slot persistence for the timer session.
#[allow(async_fn_in_trait)]
pub trait TimerStore {
    /// Reads the current session, `None` when idle.
    async fn read(&self) -> Result<Option<TimerSession>, StoreError>;
    /// Replaces the slot with `session`.
    async fn write(&self, session: &TimerSession) -> Result<(), StoreError>;
    /// Empties the slot. Succeeds if it is already empty.
    async fn clear(&self) -> Result<(), StoreError>;
}

impl<T: TimerStore> TimerStore for Arc<T> {
    async fn read(&self) -> Result<Option<TimerSession>, StoreError> {
        (**self).read().await
    }

    async fn write(&self, session: &TimerSession) -> Result<(), StoreError> {
        (**self).write(session).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        (**self).clear().await
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryTimerStore {
    slot: Mutex<Option<TimerSession>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryTimerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `session`.
    #[must_use]
    pub fn with_session(session: TimerSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes both `write` and `clear` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the stored session, bypassing failure injection.
    #[must_use]
    pub fn snapshot(&self) -> Option<TimerSession> {
        self.slot.lock().unwrap().clone()
    }

    /// Number of successful writes and clears.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl TimerStore for MemoryTimerStore {
    async fn read(&self) -> Result<Option<TimerSession>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Mock read failure".to_string()));
        }
        Ok(self.slot.lock().unwrap().clone())
    }

    async fn write(&self, session: &TimerSession) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Mock write failure".to_string()));
        }
        *self.slot.lock().unwrap() = Some(session.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Mock clear failure".to_string()));
        }
        *self.slot.lock().unwrap() = None;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskRef;

    fn session() -> TimerSession {
        TimerSession::start(TaskRef::new("a", "b", None), 0)
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryTimerStore::new();
        assert_eq!(store.read().await.unwrap(), None);

        store.write(&session()).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(session()));

        store.clear().await.unwrap();
        assert_eq!(store.read().await.unwrap(), None);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_failures() {
        let store = MemoryTimerStore::with_session(session());

        store.set_fail_reads(true);
        assert!(store.read().await.is_err());

        store.set_fail_writes(true);
        assert!(store.write(&session()).await.is_err());
        assert!(store.clear().await.is_err());

        // slot is untouched by failed operations
        assert_eq!(store.snapshot(), Some(session()));
    }

    #[tokio::test]
    async fn test_arc_store_shares_slot() {
        let store = Arc::new(MemoryTimerStore::new());
        let shared = Arc::clone(&store);

        shared.write(&session()).await.unwrap();
        assert_eq!(store.snapshot(), Some(session()));
    }
}
