//! Error types for the refresh job's LaunchAgent.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// LaunchAgent management error type.
#[derive(Debug, Error)]
pub enum LaunchAgentError {
    /// The running binary's path could not be resolved.
    #[error("Failed to resolve tasktimer binary path: {0}")]
    BinaryPathResolution(String),

    #[error("Failed to get home directory")]
    HomeDirectoryNotFound,

    /// A filesystem step of install or uninstall failed.
    #[error("Failed to {action} {path:?}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode refresh job plist: {0}")]
    Encode(#[source] ::plist::Error),

    #[error("Refresh job plist is not UTF-8: {0}")]
    NotUtf8(#[source] std::string::FromUtf8Error),

    /// launchctl could not be run at all.
    #[error("Failed to execute launchctl: {0}")]
    LaunchctlExecution(String),

    #[error("launchctl refused to load the refresh job: {0}")]
    ServiceLoad(String),

    #[error("launchctl refused to unload the refresh job: {0}")]
    ServiceUnload(String),

    /// launchd is only available on macOS.
    #[error("Background refresh via launchd is only supported on macOS")]
    UnsupportedPlatform,
}

impl LaunchAgentError {
    pub(crate) fn fs(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true if the job can never be registered on this system.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedPlatform | Self::LaunchctlExecution(_))
    }

    /// Returns a hint for fixing the error, if one exists.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedPlatform | Self::LaunchctlExecution(_) => {
                Some("Run `tasktimer watch` to keep the display current in the foreground")
            }
            Self::ServiceLoad(_) => Some("Check `launchctl list | grep tasktimer` and the plist"),
            Self::BinaryPathResolution(_) => Some("Run the installed tasktimer binary directly"),
            Self::HomeDirectoryNotFound => Some("Set HOME"),
            _ => None,
        }
    }
}

/// Result type for LaunchAgent operations.
pub type Result<T> = std::result::Result<T, LaunchAgentError>;
