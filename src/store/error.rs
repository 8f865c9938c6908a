//! Durable store error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur reading or writing the timer session slot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("timer store I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The stored record could not be decoded.
    #[error("timer store holds a corrupt session: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// The session could not be encoded.
    #[error("failed to encode timer session: {0}")]
    Encode(#[source] serde_json::Error),

    /// The backing store is not reachable.
    #[error("timer store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the stored data itself is unreadable.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}
