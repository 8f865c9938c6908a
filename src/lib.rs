//! Task Timer Library
//!
//! This library provides the core functionality for the task timer CLI.
//! It includes:
//! - Timer engine over a single durable session record
//! - Live notification gateway (native on macOS, logging elsewhere)
//! - Background refresh run by a launchd LaunchAgent
//! - Foreground sync controller for the live `watch` display
//! - Tap-to-resume notification routing
//! - Audio-cue feedback, the time-entry ledger and configuration
//! - CLI command parsing and display utilities

pub mod cli;
pub mod clock;
pub mod config;
pub mod feedback;
pub mod launchagent;
pub mod ledger;
pub mod notification;
pub mod refresh;
pub mod store;
pub mod sync;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    elapsed_seconds, seconds_to_display, ElapsedTime, StartOutcome, TaskRef, TimerSession,
    TimerSnapshot, TimerStatus,
};

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, TimerConfig};
pub use feedback::{HapticFeedback, MockHapticFeedback, NoopFeedback, Pulse};
pub use ledger::{JsonlTaskLedger, MockTaskLedger, TaskLedger, TimeEntry};
pub use notification::{
    create_gateway, DefaultGateway, LogNotificationGateway, MockNotificationGateway,
    NotificationError, NotificationGateway, NotificationPayload, NotificationRouter, Route,
};
pub use refresh::{BackgroundRefresh, RefreshResult, RefreshScheduler};
pub use store::{FileTimerStore, MemoryTimerStore, StoreError, TimerStore};
pub use sync::{AppState, DisplayState, ForegroundSync, TapOutcome, UiPhase};
pub use timer::TimerEngine;
