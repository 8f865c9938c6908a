//! Refresh job status as reported by launchd.

use super::error::Result;
use super::launchctl;
use super::plist::RefreshLaunchAgent;

/// What launchd knows about the refresh job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobStatus {
    /// The job is loaded into launchd
    pub loaded: bool,
    /// Exit status of the last `tasktimer refresh` run
    pub last_exit_status: Option<i32>,
}

impl JobStatus {
    /// Returns true if the last run reported a failed refresh.
    pub fn last_run_failed(&self) -> bool {
        self.last_exit_status.is_some_and(|code| code != 0)
    }
}

/// Queries launchd for the refresh job.
///
/// # Errors
/// Returns an error if launchctl cannot be executed.
pub fn get_status() -> Result<JobStatus> {
    Ok(match launchctl::list(RefreshLaunchAgent::LABEL)? {
        Some(output) => parse_launchctl_output(&output),
        None => JobStatus::default(),
    })
}

/// Parses the output of `launchctl list <label>`.
///
/// ```text
/// {
///     "Label" = "com.example.tasktimer.refresh";
///     "LastExitStatus" = 0;
///     ...
/// };
/// ```
fn parse_launchctl_output(output: &str) -> JobStatus {
    JobStatus {
        loaded: true,
        last_exit_status: extract_field(output, "LastExitStatus")
            .and_then(|s| s.parse::<i32>().ok()),
    }
}

fn extract_field<'a>(output: &'a str, field: &str) -> Option<&'a str> {
    let pattern = format!("\"{}\" = ", field);
    output.lines().find_map(|line| {
        if line.contains(&pattern) {
            line.split('=')
                .nth(1)
                .map(|s| s.trim().trim_matches(';').trim_matches('"').trim())
        } else {
            None
        }
    })
}
