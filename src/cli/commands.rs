//! Command definitions for the task timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

use crate::types::TaskRef;

/// Maximum task name length accepted on the command line.
const MAX_TASK_NAME_CHARS: usize = 100;

// ============================================================================
// CLI Structure
// ============================================================================

/// Task Timer CLI - a persistent per-task stopwatch
#[derive(Parser, Debug)]
#[command(
    name = "tasktimer",
    version,
    about = "Persistent per-task timer with a live notification",
    long_about = "Times work on a task across restarts. The running time is kept in the \
                  data directory and mirrored into a notification that a background \
                  refresh job keeps current.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log notifications instead of posting them
    #[arg(long, global = true)]
    pub no_notify: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start timing a task
    Start(TaskArgs),

    /// Pause the running timer
    Pause,

    /// Resume a paused timer
    Resume,

    /// Stop the timer and record the time against its task
    Stop,

    /// Show current timer status
    Status,

    /// Show a live display of the timer (Enter toggles, `s` stops, `q` quits)
    Watch(TaskArgs),

    /// Refresh the live notification once (run by the background job)
    #[command(hide = true)]
    Refresh,

    /// Install the background refresh LaunchAgent
    Install,

    /// Uninstall the background refresh LaunchAgent
    Uninstall,

    /// List recorded time entries
    Entries {
        /// Only show entries for this task
        #[arg(long)]
        task_id: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Task Arguments
// ============================================================================

/// Identifies the task a timer runs for
#[derive(Args, Debug, Clone)]
pub struct TaskArgs {
    /// Task name shown in the notification
    #[arg(short, long, value_parser = validate_task_name)]
    pub task: String,

    /// Task identifier used for tap-to-resume (defaults to the task name)
    #[arg(short = 'i', long)]
    pub task_id: Option<String>,

    /// Project the task belongs to
    #[arg(short, long)]
    pub project: Option<String>,
}

impl TaskArgs {
    /// Converts the arguments into a task reference.
    pub fn to_task_ref(&self) -> TaskRef {
        let task_id = self.task_id.clone().unwrap_or_else(|| self.task.clone());
        TaskRef::new(self.task.clone(), task_id, self.project.clone())
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the task name.
///
/// - Must not be empty or whitespace
/// - Must not exceed 100 characters
fn validate_task_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("task name must not be empty".to_string());
    }
    if s.chars().count() > MAX_TASK_NAME_CHARS {
        return Err(format!(
            "task name must be at most {} characters",
            MAX_TASK_NAME_CHARS
        ));
    }
    Ok(s.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["tasktimer"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
            assert!(!cli.no_notify);
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["tasktimer", "-v", "status"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_no_notify_after_subcommand() {
            let cli = Cli::parse_from(["tasktimer", "status", "--no-notify"]);
            assert!(cli.no_notify);
            assert!(matches!(cli.command, Some(Commands::Status)));
        }

        #[test]
        fn test_parse_simple_commands() {
            let cases: [(&str, fn(&Commands) -> bool); 7] = [
                ("pause", |c| matches!(c, Commands::Pause)),
                ("resume", |c| matches!(c, Commands::Resume)),
                ("stop", |c| matches!(c, Commands::Stop)),
                ("status", |c| matches!(c, Commands::Status)),
                ("refresh", |c| matches!(c, Commands::Refresh)),
                ("install", |c| matches!(c, Commands::Install)),
                ("uninstall", |c| matches!(c, Commands::Uninstall)),
            ];
            for (name, check) in cases {
                let cli = Cli::parse_from(["tasktimer", name]);
                let command = cli.command.expect("command");
                assert!(check(&command), "{} parsed as {:?}", name, command);
            }
        }

        #[test]
        fn test_parse_entries_filter() {
            let cli = Cli::parse_from(["tasktimer", "entries", "--task-id", "t-1"]);
            match cli.command {
                Some(Commands::Entries { task_id }) => {
                    assert_eq!(task_id.as_deref(), Some("t-1"));
                }
                _ => panic!("Expected Entries command"),
            }

            let cli = Cli::parse_from(["tasktimer", "entries"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Entries { task_id: None })
            ));
        }

        #[test]
        fn test_parse_completions_zsh() {
            let cli = Cli::parse_from(["tasktimer", "completions", "zsh"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Zsh);
                }
                _ => panic!("Expected Completions command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Task Argument Tests
    // ------------------------------------------------------------------------

    mod task_args_tests {
        use super::*;

        #[test]
        fn test_parse_start_full() {
            let cli = Cli::parse_from([
                "tasktimer",
                "start",
                "--task",
                "Write report",
                "--task-id",
                "t-42",
                "--project",
                "p-7",
            ]);
            match cli.command {
                Some(Commands::Start(args)) => {
                    let task = args.to_task_ref();
                    assert_eq!(task.task_name, "Write report");
                    assert_eq!(task.task_id, "t-42");
                    assert_eq!(task.project_id.as_deref(), Some("p-7"));
                }
                _ => panic!("Expected Start command"),
            }
        }

        #[test]
        fn test_parse_start_short_flags() {
            let cli = Cli::parse_from(["tasktimer", "start", "-t", "Review", "-i", "r1", "-p", "p"]);
            match cli.command {
                Some(Commands::Start(args)) => {
                    assert_eq!(args.task, "Review");
                    assert_eq!(args.task_id.as_deref(), Some("r1"));
                    assert_eq!(args.project.as_deref(), Some("p"));
                }
                _ => panic!("Expected Start command"),
            }
        }

        #[test]
        fn test_task_id_defaults_to_name() {
            let cli = Cli::parse_from(["tasktimer", "watch", "--task", "Inbox"]);
            match cli.command {
                Some(Commands::Watch(args)) => {
                    let task = args.to_task_ref();
                    assert_eq!(task.task_id, "Inbox");
                    assert!(task.project_id.is_none());
                }
                _ => panic!("Expected Watch command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Validation Tests
    // ------------------------------------------------------------------------

    mod validation_tests {
        use super::*;

        #[test]
        fn test_validate_task_name_valid() {
            assert_eq!(validate_task_name("Valid task").unwrap(), "Valid task");
        }

        #[test]
        fn test_validate_task_name_multibyte() {
            assert!(validate_task_name(&"タ".repeat(100)).is_ok());
        }

        #[test]
        fn test_validate_task_name_empty() {
            assert!(validate_task_name("").unwrap_err().contains("empty"));
            assert!(validate_task_name("   ").is_err());
        }

        #[test]
        fn test_validate_task_name_too_long() {
            let result = validate_task_name(&"a".repeat(101));
            assert!(result.unwrap_err().contains("100"));
        }
    }

    // ------------------------------------------------------------------------
    // Error Case Tests (using try_parse)
    // ------------------------------------------------------------------------

    mod error_tests {
        use super::*;

        #[test]
        fn test_start_requires_task() {
            assert!(Cli::try_parse_from(["tasktimer", "start"]).is_err());
        }

        #[test]
        fn test_start_rejects_empty_task() {
            assert!(Cli::try_parse_from(["tasktimer", "start", "--task", ""]).is_err());
        }

        #[test]
        fn test_parse_unknown_command() {
            assert!(Cli::try_parse_from(["tasktimer", "unknown"]).is_err());
        }

        #[test]
        fn test_parse_completions_invalid_shell() {
            assert!(Cli::try_parse_from(["tasktimer", "completions", "invalid"]).is_err());
        }
    }
}
