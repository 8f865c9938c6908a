//! Registration of the background refresh with the OS scheduler.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{info, warn};

use crate::launchagent::{self, LaunchAgentError, RefreshLaunchAgent};

/// Environment variable carrying the data directory into the refresh job.
pub const HOME_ENV: &str = "TASKTIMER_HOME";

/// A periodic-execution facility that can run the refresh task.
pub trait RefreshScheduler {
    /// Registers (or re-registers) the task to run every `interval`.
    fn register(&self, interval: Duration) -> Result<(), LaunchAgentError>;
    /// Removes the registration. Succeeds if nothing is registered.
    fn unregister(&self) -> Result<(), LaunchAgentError>;
    fn is_registered(&self) -> bool;
}

/// Registers the background refresh, degrading to foreground-only mode on
/// failure.
///
/// Returns false (and logs) when registration fails; the timer keeps
/// working but the notification is not refreshed while backgrounded.
pub fn register_background_refresh<R: RefreshScheduler>(scheduler: &R, interval: Duration) -> bool {
    match scheduler.register(interval) {
        Ok(()) => {
            info!("Background refresh registered every {}s", interval.as_secs());
            true
        }
        Err(e) if e.is_unsupported() => {
            info!("Background refresh not supported here ({}); foreground only", e);
            false
        }
        Err(e) => {
            warn!(
                "Background refresh unavailable, notification will only update in the foreground: {}",
                e
            );
            false
        }
    }
}

// ============================================================================
// LaunchAgentScheduler
// ============================================================================

/// Schedules `tasktimer refresh` through a launchd LaunchAgent.
#[derive(Debug, Clone)]
pub struct LaunchAgentScheduler {
    binary_path: String,
    data_dir: PathBuf,
}

impl LaunchAgentScheduler {
    /// Creates a scheduler for `binary_path` operating on `data_dir`.
    pub fn new(binary_path: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Creates a scheduler for the currently running binary.
    ///
    /// # Errors
    /// Returns an error if the executable path cannot be resolved.
    pub fn for_current_exe(data_dir: impl Into<PathBuf>) -> Result<Self, LaunchAgentError> {
        Ok(Self::new(launchagent::resolve_binary_path()?, data_dir))
    }

    /// Builds the job definition for `interval`.
    pub fn agent(&self, interval: Duration) -> RefreshLaunchAgent {
        RefreshLaunchAgent::new(
            self.binary_path.clone(),
            &self.data_dir.join("logs"),
            interval.as_secs().max(1),
        )
        .with_env(HOME_ENV, self.data_dir.to_string_lossy())
    }
}

impl RefreshScheduler for LaunchAgentScheduler {
    fn register(&self, interval: Duration) -> Result<(), LaunchAgentError> {
        launchagent::install(&self.agent(interval)).map(|_| ())
    }

    fn unregister(&self) -> Result<(), LaunchAgentError> {
        launchagent::uninstall()
    }

    fn is_registered(&self) -> bool {
        launchagent::is_installed()
    }
}

// ============================================================================
// MockRefreshScheduler
// ============================================================================

#[derive(Debug, Default)]
pub struct MockRefreshScheduler {
    interval: Mutex<Option<Duration>>,
    should_fail: AtomicBool,
}

impl MockRefreshScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// The registered interval, if any.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        *self.interval.lock().unwrap()
    }
}

impl RefreshScheduler for MockRefreshScheduler {
    fn register(&self, interval: Duration) -> Result<(), LaunchAgentError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(LaunchAgentError::ServiceLoad("Mock failure".to_string()));
        }
        *self.interval.lock().unwrap() = Some(interval);
        Ok(())
    }

    fn unregister(&self) -> Result<(), LaunchAgentError> {
        *self.interval.lock().unwrap() = None;
        Ok(())
    }

    fn is_registered(&self) -> bool {
        self.interval.lock().unwrap().is_some()
    }
}
