//! LaunchAgent management for the background refresh job.
//!
//! launchd is the periodic-execution facility on macOS: the job runs
//! `tasktimer refresh` every `StartInterval` seconds and at login, whether
//! or not any other tasktimer process is alive.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tasktimer::launchagent::{self, RefreshLaunchAgent};
//!
//! let binary = launchagent::resolve_binary_path()?;
//! let agent = RefreshLaunchAgent::new(binary, Path::new("/tmp/logs"), 60);
//! launchagent::install(&agent)?;
//! launchagent::uninstall()?;
//! # Ok::<(), launchagent::LaunchAgentError>(())
//! ```

pub mod error;
pub mod launchctl;
pub mod plist;
pub mod status;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub use error::{LaunchAgentError, Result};
pub use plist::RefreshLaunchAgent;
pub use status::{get_status, JobStatus};

/// Returns `~/Library/LaunchAgents/<label>.plist`.
///
/// # Errors
/// Returns an error if the home directory cannot be determined.
pub fn plist_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or(LaunchAgentError::HomeDirectoryNotFound)?;
    Ok(home_dir.join(format!(
        "Library/LaunchAgents/{}.plist",
        RefreshLaunchAgent::LABEL
    )))
}

/// Returns true if the refresh job's plist exists.
pub fn is_installed() -> bool {
    plist_path().map(|p| p.exists()).unwrap_or(false)
}

/// Writes `agent` to `path` with mode 0644, creating parent directories.
///
/// # Errors
/// Returns an error if serialization or any filesystem step fails.
pub fn write_plist(path: &Path, agent: &RefreshLaunchAgent) -> Result<()> {
    let plist_xml = agent.to_xml()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LaunchAgentError::fs("create", parent, e))?;
    }
    fs::write(path, plist_xml).map_err(|e| LaunchAgentError::fs("write", path, e))?;

    let mut perms = fs::metadata(path)
        .map_err(|e| LaunchAgentError::fs("stat", path, e))?
        .permissions();
    perms.set_mode(0o644);
    fs::set_permissions(path, perms).map_err(|e| LaunchAgentError::fs("chmod", path, e))?;
    Ok(())
}

/// Installs (or reinstalls) the refresh job and loads it into launchd.
///
/// This function:
/// 1. Creates the job's log directory
/// 2. Writes the plist to ~/Library/LaunchAgents/
/// 3. Unloads any previous version of the job
/// 4. Loads the new one
///
/// # Errors
/// Returns an error on non-macOS platforms, on filesystem failures, or if
/// launchctl rejects the job.
pub fn install(agent: &RefreshLaunchAgent) -> Result<PathBuf> {
    if !cfg!(target_os = "macos") {
        return Err(LaunchAgentError::UnsupportedPlatform);
    }

    if let Some(log_dir) = Path::new(&agent.standard_out_path).parent() {
        fs::create_dir_all(log_dir).map_err(|e| LaunchAgentError::fs("create", log_dir, e))?;
    }

    let path = plist_path()?;
    write_plist(&path, agent)?;

    let _ = launchctl::unload(&path);
    launchctl::load(&path)?;

    tracing::info!("Refresh job installed at {:?}", path);
    Ok(path)
}

/// Unloads and removes the refresh job. Succeeds if it is not installed.
///
/// # Errors
/// Returns an error if the home directory is unknown or the plist cannot
/// be removed.
pub fn uninstall() -> Result<()> {
    let path = plist_path()?;

    if !path.exists() {
        tracing::info!("Refresh job plist does not exist, nothing to uninstall");
        return Ok(());
    }

    let _ = launchctl::unload(&path);
    fs::remove_file(&path).map_err(|e| LaunchAgentError::fs("remove", &path, e))?;

    tracing::info!("Refresh job uninstalled");
    Ok(())
}

/// Resolves the absolute path of the running tasktimer binary.
///
/// # Errors
/// Returns an error if the executable path is unavailable.
pub fn resolve_binary_path() -> Result<String> {
    let path = std::env::current_exe()
        .map_err(|e| LaunchAgentError::BinaryPathResolution(e.to_string()))?;
    let path = path.canonicalize().unwrap_or(path);
    Ok(path.to_string_lossy().into_owned())
}
