//! Launchctl command execution wrapper.

use std::path::Path;
use std::process::Command;

use super::error::{LaunchAgentError, Result};

/// Loads a job with `launchctl load <plist_path>`.
///
/// # Errors
/// - If the launchctl command fails to execute
/// - If launchd rejects the job
pub fn load(plist_path: &Path) -> Result<()> {
    let output = Command::new("launchctl")
        .arg("load")
        .arg(plist_path)
        .output()
        .map_err(|e| LaunchAgentError::LaunchctlExecution(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LaunchAgentError::ServiceLoad(stderr.to_string()));
    }

    tracing::debug!("launchctl load succeeded for {:?}", plist_path);
    Ok(())
}

/// Unloads a job with `launchctl unload <plist_path>`.
///
/// Fails if the job is not loaded; callers resetting state ignore that.
pub fn unload(plist_path: &Path) -> Result<()> {
    let output = Command::new("launchctl")
        .arg("unload")
        .arg(plist_path)
        .output()
        .map_err(|e| LaunchAgentError::LaunchctlExecution(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!("launchctl unload failed (may be already unloaded): {}", stderr);
        return Err(LaunchAgentError::ServiceUnload(stderr.to_string()));
    }

    tracing::debug!("launchctl unload succeeded for {:?}", plist_path);
    Ok(())
}

/// Runs `launchctl list <label>`, returning its stdout if the job is known.
pub fn list(label: &str) -> Result<Option<String>> {
    let output = Command::new("launchctl")
        .arg("list")
        .arg(label)
        .output()
        .map_err(|e| LaunchAgentError::LaunchctlExecution(e.to_string()))?;

    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
}

#[cfg(all(test, target_os = "macos"))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_missing_plist_fails() {
        let path = PathBuf::from("/nonexistent/path/to/plist");
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_list_unknown_label() {
        let result = list("com.example.tasktimer.does-not-exist").unwrap();
        assert!(result.is_none());
    }
}
