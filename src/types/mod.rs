//! Core data types for the task timer.
//!
//! This module defines the data structures used for:
//! - The persisted timer session (the single store slot)
//! - Timer status derived from the session
//! - Elapsed-time arithmetic and `HH:MM:SS` display formatting

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Elapsed-time arithmetic
// ============================================================================

/// Returns whole seconds elapsed between two epoch-millisecond instants.
///
/// Computed as `floor((now_ms - start_ms) / 1000)`. A start instant in the
/// future (wall-clock moved backwards) yields zero.
pub fn elapsed_seconds(start_ms: i64, now_ms: i64) -> u64 {
    let delta = now_ms.saturating_sub(start_ms);
    if delta <= 0 {
        0
    } else {
        (delta / 1000) as u64
    }
}

/// Formats a total number of seconds as `HH:MM:SS`.
///
/// Hours are not wrapped at 24: `90061` formats as `"25:01:01"`.
pub fn seconds_to_display(total_seconds: u64) -> String {
    ElapsedTime::from_seconds(total_seconds).to_string()
}

// ============================================================================
// TimerStatus
// ============================================================================

/// The timer state machine's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// No session is persisted.
    #[default]
    Idle,
    /// A session is actively counting.
    Running,
    /// A session exists but is not counting.
    Paused,
}

impl TimerStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }

    /// Returns true if a session exists in this status.
    pub fn is_active(&self) -> bool {
        !matches!(self, TimerStatus::Idle)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ElapsedTime
// ============================================================================

/// An elapsed duration broken down for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl ElapsedTime {
    /// Zero elapsed time.
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Breaks a total number of seconds into hours, minutes and seconds.
    pub fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// Returns the total number of seconds.
    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

// ============================================================================
// TaskRef
// ============================================================================

/// Identifies the task being timed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    /// Display name, used in notification text
    pub task_name: String,
    /// Task identifier, used for tap-to-resume routing
    pub task_id: String,
    /// Owning project, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl TaskRef {
    /// Creates a new task reference.
    pub fn new(
        task_name: impl Into<String>,
        task_id: impl Into<String>,
        project_id: Option<String>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            task_id: task_id.into(),
            project_id,
        }
    }
}

// ============================================================================
// TimerSession
// ============================================================================

/// The single persisted timer record.
///
/// While `is_running` is true the elapsed time is `now - start_time` and
/// `elapsed_time` is only a cache. While paused, `elapsed_time` is
/// authoritative and `start_time` is stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    /// True if actively counting (not paused)
    pub is_running: bool,
    /// Epoch milliseconds elapsed time is computed from; re-anchored on resume
    pub start_time: i64,
    /// Task display name
    pub task_name: String,
    /// Task identifier
    pub task_id: String,
    /// Owning project identifier
    #[serde(default)]
    pub project_id: Option<String>,
    /// Accumulated seconds, authoritative while paused
    #[serde(default)]
    pub elapsed_time: u64,
    /// Handle of the live notification
    #[serde(default)]
    pub notification_id: Option<String>,
}

impl TimerSession {
    /// Creates a freshly started session anchored at `now_ms`.
    pub fn start(task: TaskRef, now_ms: i64) -> Self {
        Self {
            is_running: true,
            start_time: now_ms,
            task_name: task.task_name,
            task_id: task.task_id,
            project_id: task.project_id,
            elapsed_time: 0,
            notification_id: None,
        }
    }

    /// Returns the state-machine status of this session.
    pub fn status(&self) -> TimerStatus {
        if self.is_running {
            TimerStatus::Running
        } else {
            TimerStatus::Paused
        }
    }

    /// Returns the true elapsed seconds at `now_ms`.
    pub fn elapsed_at(&self, now_ms: i64) -> u64 {
        if self.is_running {
            elapsed_seconds(self.start_time, now_ms)
        } else {
            self.elapsed_time
        }
    }

    /// Freezes the session at `now_ms`, returning the paused elapsed seconds.
    ///
    /// Has no effect on a session that is already paused.
    pub fn pause_at(&mut self, now_ms: i64) -> u64 {
        if self.is_running {
            self.elapsed_time = elapsed_seconds(self.start_time, now_ms);
            self.is_running = false;
        }
        self.elapsed_time
    }

    /// Re-anchors `start_time` so counting continues from `elapsed_time`.
    ///
    /// Has no effect on a session that is already running.
    pub fn resume_at(&mut self, now_ms: i64) -> u64 {
        if !self.is_running {
            let offset_ms = i64::try_from(self.elapsed_time)
                .unwrap_or(i64::MAX / 1000)
                .saturating_mul(1000);
            self.start_time = now_ms.saturating_sub(offset_ms);
            self.is_running = true;
        }
        self.elapsed_time
    }

    /// Returns the task this session times.
    pub fn task(&self) -> TaskRef {
        TaskRef {
            task_name: self.task_name.clone(),
            task_id: self.task_id.clone(),
            project_id: self.project_id.clone(),
        }
    }
}

// ============================================================================
// StartOutcome
// ============================================================================

/// Result of a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session was persisted.
    Started {
        /// Live notification handle, `None` if scheduling failed
        notification_id: Option<String>,
    },
    /// A session already exists; nothing was changed.
    AlreadyActive,
    /// The initial store write failed; the timer did not start.
    Failed,
}

impl StartOutcome {
    /// Returns true if a new session was created.
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started { .. })
    }

    /// Returns the live notification handle, if any.
    pub fn notification_id(&self) -> Option<&str> {
        match self {
            StartOutcome::Started { notification_id } => notification_id.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// A read-only view of the current session at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    /// Running or Paused
    pub status: TimerStatus,
    /// Derived elapsed time
    pub elapsed: ElapsedTime,
    /// The task being timed
    pub task: TaskRef,
    /// Live notification handle
    pub notification_id: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
