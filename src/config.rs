//! Timer configuration and data-directory resolution.
//!
//! Configuration lives in `<data_dir>/config.json`. Every field is
//! optional; a missing file means all defaults.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::refresh::HOME_ENV;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Data directory name under the home directory.
const DEFAULT_DIR_NAME: &str = ".tasktimer";

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    OutOfRange(String),

    #[error("Failed to determine home directory; set TASKTIMER_HOME")]
    HomeDirectoryNotFound,
}

/// Timer configuration.
///
/// # Example
///
/// ```
/// use tasktimer::config::TimerConfig;
///
/// let config = TimerConfig::default();
/// assert_eq!(config.refresh_interval_secs, 60);
/// assert_eq!(config.poll_interval_ms, 1000);
/// assert!(config.notifications);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerConfig {
    /// Seconds between background refresh runs (1-86400)
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Foreground polling period in milliseconds (100-10000)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Use native notifications; false logs them instead
    #[serde(default = "default_true")]
    pub notifications: bool,

    /// Play feedback cues on state changes
    #[serde(default = "default_true")]
    pub feedback: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            notifications: true,
            feedback: true,
        }
    }
}

impl TimerConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=86_400).contains(&self.refresh_interval_secs) {
            return Err(ConfigError::OutOfRange(
                "refresh_interval_secs must be between 1 and 86400".to_string(),
            ));
        }
        if !(100..=10_000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::OutOfRange(
                "poll_interval_ms must be between 100 and 10000".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads and validates `<data_dir>/config.json`.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Resolves the data directory: `$TASKTIMER_HOME`, else `~/.tasktimer`.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::home_dir()
            .map(|home| home.join(DEFAULT_DIR_NAME))
            .ok_or(ConfigError::HomeDirectoryNotFound),
    }
}
