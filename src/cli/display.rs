//! Display utilities for the task timer CLI.
//!
//! This module provides formatted output for:
//! - Timer transitions and status
//! - The live `watch` line
//! - Recorded time entries
//! - Error messages

use std::io::Write;

use crate::launchagent::JobStatus;
use crate::ledger::TimeEntry;
use crate::notification::Route;
use crate::sync::{DisplayState, UiPhase};
use crate::types::{seconds_to_display, StartOutcome, TaskRef, TimerSnapshot, TimerStatus};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a start request.
    pub fn show_start(task: &TaskRef, outcome: &StartOutcome) {
        match outcome {
            StartOutcome::Started { notification_id } => {
                println!("> Timer started");
                println!("  Task: {}", Self::task_label(task));
                match notification_id {
                    Some(id) => println!("  Notification: {}", id),
                    None => println!("  (live notification unavailable)"),
                }
            }
            StartOutcome::AlreadyActive => {
                println!("A timer is already active; use pause, resume or stop");
            }
            StartOutcome::Failed => {
                println!("The timer could not be started");
            }
        }
    }

    /// Shows the result of a pause request.
    pub fn show_pause(elapsed: Option<u64>) {
        match elapsed {
            Some(seconds) => {
                println!("|| Timer paused");
                println!("  Elapsed: {}", seconds_to_display(seconds));
            }
            None => println!("No running timer to pause"),
        }
    }

    /// Shows the result of a resume request.
    pub fn show_resume(elapsed: Option<u64>) {
        match elapsed {
            Some(seconds) => {
                println!("> Timer resumed");
                println!("  Elapsed: {}", seconds_to_display(seconds));
            }
            None => println!("No paused timer to resume"),
        }
    }

    /// Shows the result of a stop request.
    pub fn show_stop(entry: Option<&TimeEntry>) {
        match entry {
            Some(entry) => {
                println!("[] Timer stopped");
                println!("  Task: {}", entry.task_name);
                println!("  Recorded: {}", seconds_to_display(entry.seconds));
            }
            None => println!("No timer to stop"),
        }
    }

    /// Shows the current timer status.
    pub fn show_status(snapshot: Option<&TimerSnapshot>, refresh: Option<&JobStatus>) {
        println!("Task Timer Status");
        println!("─────────────────────────────");

        match snapshot {
            Some(snapshot) => {
                println!("State: {}", Self::status_label(snapshot.status));
                println!("Elapsed: {}", snapshot.elapsed);
                println!("Task: {}", Self::task_label(&snapshot.task));
            }
            None => println!("State: {}", Self::status_label(TimerStatus::Idle)),
        }

        if let Some(job) = refresh {
            println!("Background refresh: {}", Self::refresh_label(job));
        }
    }

    /// Rewrites the live line of the `watch` display in place.
    pub fn show_watch_line(state: &DisplayState) {
        let mut stdout = std::io::stdout();
        // A failed write to the terminal leaves nothing useful to do.
        let _ = write!(stdout, "\r\x1b[2K{}", Self::format_watch_line(state));
        let _ = stdout.flush();
    }

    /// Prints the key help shown when `watch` starts.
    pub fn show_watch_help() {
        println!("Enter: start / pause / resume   s: stop   q: quit");
    }

    /// Shows recorded time entries with a total.
    pub fn show_entries(entries: &[TimeEntry]) {
        if entries.is_empty() {
            println!("No time entries recorded");
            return;
        }

        for entry in entries {
            println!("{}", Self::format_entry(entry));
        }
        let total: u64 = entries.iter().map(|e| e.seconds).sum();
        println!("─────────────────────────────");
        println!("Total: {} ({} entries)", seconds_to_display(total), entries.len());
    }

    /// Shows where a tapped notification led.
    pub fn show_route(route: &Route) {
        match route {
            Route::Task {
                task_id,
                project_id,
            } => println!("\nOpened task {} in project {}", task_id, project_id),
            Route::Home => println!("\nOpened home"),
        }
    }

    /// Shows a success message for LaunchAgent installation.
    pub fn show_install_success(interval_secs: u64) {
        println!("* Background refresh installed");
        println!("  The notification refreshes every {}s", interval_secs);
    }

    /// Shows a success message for LaunchAgent uninstallation.
    pub fn show_uninstall_success() {
        println!("* Background refresh uninstalled");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Shows how to fix the preceding error.
    pub fn show_hint(hint: &str) {
        eprintln!("  hint: {}", hint);
    }

    fn status_label(status: TimerStatus) -> &'static str {
        match status {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }

    fn refresh_label(job: &JobStatus) -> &'static str {
        if !job.loaded {
            "not installed"
        } else if job.last_run_failed() {
            "last run failed"
        } else {
            "active"
        }
    }

    fn task_label(task: &TaskRef) -> String {
        match &task.project_id {
            Some(project) => format!("{} ({}/{})", task.task_name, project, task.task_id),
            None if task.task_id != task.task_name => {
                format!("{} ({})", task.task_name, task.task_id)
            }
            None => task.task_name.clone(),
        }
    }

    fn format_watch_line(state: &DisplayState) -> String {
        let marker = match state.phase {
            UiPhase::Idle => "[ ]",
            UiPhase::Running => "[>]",
            UiPhase::Paused => "[|]",
        };
        match &state.task {
            Some(task) => format!("{} {}  {}", marker, state.time_string(), task.task_name),
            None => format!("{} {}", marker, state.time_string()),
        }
    }

    fn format_entry(entry: &TimeEntry) -> String {
        format!(
            "{}  {:<30} {}",
            seconds_to_display(entry.seconds),
            entry.task_name,
            entry.task_id
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
