//! Plist definition for the periodic background refresh job.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{LaunchAgentError, Result};

/// LaunchAgent plist that runs `tasktimer refresh` on a fixed interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshLaunchAgent {
    /// Service label (reverse domain format)
    #[serde(rename = "Label")]
    pub label: String,

    /// Program to execute with its arguments
    #[serde(rename = "ProgramArguments")]
    pub program_arguments: Vec<String>,

    /// Seconds between invocations
    #[serde(rename = "StartInterval")]
    pub start_interval: u64,

    /// Run once as soon as the job is loaded (login, boot, install)
    #[serde(rename = "RunAtLoad")]
    pub run_at_load: bool,

    /// The job exits after each run; launchd must not restart it
    #[serde(rename = "KeepAlive")]
    pub keep_alive: bool,

    #[serde(rename = "StandardOutPath")]
    pub standard_out_path: String,

    #[serde(rename = "StandardErrorPath")]
    pub standard_error_path: String,

    #[serde(
        rename = "EnvironmentVariables",
        skip_serializing_if = "Option::is_none"
    )]
    pub environment_variables: Option<BTreeMap<String, String>>,
}

impl RefreshLaunchAgent {
    /// The service label for the refresh job.
    pub const LABEL: &'static str = "com.example.tasktimer.refresh";

    /// Subcommand launchd invokes.
    pub const REFRESH_ARG: &'static str = "refresh";

    /// Creates the job definition.
    ///
    /// # Arguments
    /// * `binary_path` - Absolute path to the tasktimer binary
    /// * `log_dir` - Directory receiving `refresh.out.log` / `refresh.err.log`
    /// * `interval_secs` - StartInterval in seconds
    pub fn new(binary_path: impl Into<String>, log_dir: &Path, interval_secs: u64) -> Self {
        Self {
            label: Self::LABEL.to_string(),
            program_arguments: vec![binary_path.into(), Self::REFRESH_ARG.to_string()],
            start_interval: interval_secs,
            run_at_load: true,
            keep_alive: false,
            standard_out_path: log_dir.join("refresh.out.log").to_string_lossy().into_owned(),
            standard_error_path: log_dir.join("refresh.err.log").to_string_lossy().into_owned(),
            environment_variables: None,
        }
    }

    /// Adds an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Generates the plist XML string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, self).map_err(LaunchAgentError::Encode)?;
        String::from_utf8(buf).map_err(LaunchAgentError::NotUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> RefreshLaunchAgent {
        RefreshLaunchAgent::new(
            "/usr/local/bin/tasktimer",
            Path::new("/Users/test/.tasktimer/logs"),
            60,
        )
    }

    #[test]
    fn test_new_creates_periodic_job() {
        let plist = agent();

        assert_eq!(plist.label, "com.example.tasktimer.refresh");
        assert_eq!(
            plist.program_arguments,
            vec!["/usr/local/bin/tasktimer", "refresh"]
        );
        assert_eq!(plist.start_interval, 60);
        assert!(plist.run_at_load);
        assert!(!plist.keep_alive);
        assert_eq!(
            plist.standard_out_path,
            "/Users/test/.tasktimer/logs/refresh.out.log"
        );
        assert_eq!(
            plist.standard_error_path,
            "/Users/test/.tasktimer/logs/refresh.err.log"
        );
        assert!(plist.environment_variables.is_none());
    }

    #[test]
    fn test_to_xml() {
        let xml = agent()
            .with_env("TASKTIMER_HOME", "/Users/test/.tasktimer")
            .to_xml()
            .expect("Failed to generate XML");

        assert!(xml.contains("<key>StartInterval</key>"));
        assert!(xml.contains("<integer>60</integer>"));
        assert!(xml.contains("<string>refresh</string>"));
        assert!(xml.contains("<key>KeepAlive</key>"));
        assert!(xml.contains("<false/>"));
        assert!(xml.contains("<key>TASKTIMER_HOME</key>"));
    }

    #[test]
    fn test_xml_omits_environment_when_unset() {
        let xml = agent().to_xml().expect("Failed to generate XML");
        assert!(!xml.contains("EnvironmentVariables"));
    }

    #[test]
    fn test_parses_back() {
        let original = agent().with_env("RUST_LOG", "info");
        let xml = original.to_xml().expect("Failed to generate XML");
        let parsed: RefreshLaunchAgent =
            plist::from_bytes(xml.as_bytes()).expect("Failed to parse XML");

        assert_eq!(parsed, original);
    }
}
