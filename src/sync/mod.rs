//! Foreground sync controller.
//!
//! Keeps a screen's local display in step with the durable timer while the
//! app is in front:
//!
//! - **Mount**: adopt an existing session rather than starting a new one
//! - **Polling**: while Running and Active, re-read the elapsed time every
//!   poll period; a vanished session resets the display to Idle
//! - **Reconciliation**: every return to Active re-reads the store as
//!   ground truth, picking up whatever happened while backgrounded
//! - **Touch mapping**: tap starts, pauses or resumes; stop finishes the
//!   session and yields a [`TimeEntry`]
//!
//! The poll timer is a [`tokio::time::Interval`] owned by the controller.
//! Cancelling polling drops it. Hosts drive the controller from a
//! `tokio::select!` loop through [`ForegroundSync::next_tick`].
//!
//! Transitions take `&mut self`, so rapid taps are applied strictly one
//! after another and each one sees the previous one's result.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::feedback::{HapticFeedback, Pulse};
use crate::ledger::TimeEntry;
use crate::notification::NotificationGateway;
use crate::store::TimerStore;
use crate::timer::TimerEngine;
use crate::types::{ElapsedTime, StartOutcome, TaskRef, TimerStatus};

// ============================================================================
// Types
// ============================================================================

/// Host application lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

/// The screen's local view of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiPhase {
    #[default]
    Idle,
    Running,
    Paused,
}

impl From<TimerStatus> for UiPhase {
    fn from(status: TimerStatus) -> Self {
        match status {
            TimerStatus::Idle => UiPhase::Idle,
            TimerStatus::Running => UiPhase::Running,
            TimerStatus::Paused => UiPhase::Paused,
        }
    }
}

/// What the screen currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayState {
    pub phase: UiPhase,
    pub elapsed: ElapsedTime,
    /// Task of the adopted or started session
    pub task: Option<TaskRef>,
}

impl DisplayState {
    /// The `HH:MM:SS` string to render.
    pub fn time_string(&self) -> String {
        self.elapsed.to_string()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of a tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    Started { notification_id: Option<String> },
    /// The initial store write failed; the timer is still idle.
    StartFailed,
    Paused { elapsed: u64 },
    Resumed { elapsed: u64 },
    /// The store disagreed with the screen; the display was re-synced and
    /// nothing else changed.
    Resynced,
}

/// Returns true if the gap between two ticks means the process was
/// suspended (more than two poll periods of wall-clock time).
pub fn is_suspension_gap(last_tick_ms: i64, now_ms: i64, poll_interval: Duration) -> bool {
    let period_ms = i64::try_from(poll_interval.as_millis()).unwrap_or(i64::MAX / 2);
    now_ms.saturating_sub(last_tick_ms) > period_ms.saturating_mul(2)
}

// ============================================================================
// ForegroundSync
// ============================================================================

pub struct ForegroundSync<S, N, C> {
    engine: TimerEngine<S, N, C>,
    haptics: Arc<dyn HapticFeedback>,
    /// Task this screen starts when tapped from Idle
    task: TaskRef,
    poll_interval: Duration,
    ticker: Option<Interval>,
    app_state: AppState,
    display: DisplayState,
}

impl<S, N, C> ForegroundSync<S, N, C>
where
    S: TimerStore,
    N: NotificationGateway,
    C: Clock,
{
    pub fn new(
        engine: TimerEngine<S, N, C>,
        haptics: Arc<dyn HapticFeedback>,
        task: TaskRef,
        poll_interval: Duration,
    ) -> Self {
        Self {
            engine,
            haptics,
            task,
            poll_interval,
            ticker: None,
            app_state: AppState::Active,
            display: DisplayState::default(),
        }
    }

    pub fn engine(&self) -> &TimerEngine<S, N, C> {
        &self.engine
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    pub fn is_polling(&self) -> bool {
        self.ticker.is_some()
    }

    /// Initializes the display from the store.
    pub async fn mount(&mut self) -> &DisplayState {
        self.reconcile().await
    }

    /// Tears down polling.
    pub fn unmount(&mut self) {
        self.stop_polling();
    }

    /// Re-derives the display from the store and restarts or cancels
    /// polling to match.
    pub async fn reconcile(&mut self) -> &DisplayState {
        match self.engine.snapshot().await {
            Some(snapshot) => {
                self.display = DisplayState {
                    phase: snapshot.status.into(),
                    elapsed: snapshot.elapsed,
                    task: Some(snapshot.task),
                };
            }
            None => self.display.reset(),
        }
        debug!(
            "Reconciled: {:?} {}",
            self.display.phase,
            self.display.time_string()
        );
        self.sync_polling();
        &self.display
    }

    /// Reads the current time once and updates the display.
    pub async fn poll(&mut self) -> &DisplayState {
        match self.engine.get_current_time().await {
            Some(elapsed) => self.display.elapsed = elapsed,
            None => {
                info!("Timer session ended elsewhere; display reset");
                self.display.reset();
                self.stop_polling();
            }
        }
        &self.display
    }

    /// Waits for the next poll tick and polls.
    ///
    /// Never completes while polling is off, so it can sit in a
    /// `tokio::select!` next to other event sources.
    pub async fn next_tick(&mut self) -> DisplayState {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
        self.poll().await.clone()
    }

    /// Handles a lifecycle transition of the host application.
    pub async fn on_app_state_change(&mut self, state: AppState) {
        let previous = std::mem::replace(&mut self.app_state, state);
        if state == AppState::Active {
            if previous != AppState::Active {
                debug!("Returned to foreground from {:?}", previous);
                self.reconcile().await;
            }
        } else {
            self.stop_polling();
        }
    }

    /// Maps a tap to start, pause or resume based on the displayed phase.
    pub async fn tap(&mut self) -> TapOutcome {
        match self.display.phase {
            UiPhase::Idle => match self.engine.start(self.task.clone()).await {
                StartOutcome::Started { notification_id } => {
                    self.haptics.pulse(Pulse::Light);
                    self.display = DisplayState {
                        phase: UiPhase::Running,
                        elapsed: ElapsedTime::ZERO,
                        task: Some(self.task.clone()),
                    };
                    self.sync_polling();
                    TapOutcome::Started { notification_id }
                }
                StartOutcome::AlreadyActive => {
                    self.reconcile().await;
                    TapOutcome::Resynced
                }
                StartOutcome::Failed => {
                    warn!("Timer did not start");
                    TapOutcome::StartFailed
                }
            },
            UiPhase::Running => match self.engine.pause().await {
                Some(elapsed) => {
                    self.haptics.pulse(Pulse::Light);
                    self.display.phase = UiPhase::Paused;
                    self.display.elapsed = ElapsedTime::from_seconds(elapsed);
                    self.sync_polling();
                    TapOutcome::Paused { elapsed }
                }
                None => {
                    self.reconcile().await;
                    TapOutcome::Resynced
                }
            },
            UiPhase::Paused => match self.engine.resume().await {
                Some(elapsed) => {
                    self.haptics.pulse(Pulse::Light);
                    self.display.phase = UiPhase::Running;
                    self.display.elapsed = ElapsedTime::from_seconds(elapsed);
                    self.sync_polling();
                    TapOutcome::Resumed { elapsed }
                }
                None => {
                    self.reconcile().await;
                    TapOutcome::Resynced
                }
            },
        }
    }

    /// Stops the timer and returns the finished entry.
    ///
    /// Only available while Running or Paused; returns `None` when Idle.
    pub async fn stop(&mut self) -> Option<TimeEntry> {
        if self.display.phase == UiPhase::Idle {
            debug!("Stop ignored: timer is idle");
            return None;
        }

        // The session may have been finished or replaced by another process
        // since the last poll; book the time against what the store holds.
        let Some(snapshot) = self.engine.snapshot().await else {
            debug!("Stop ignored: session already finished elsewhere");
            self.reconcile().await;
            return None;
        };

        let seconds = self.engine.stop().await;
        self.haptics.pulse(Pulse::Heavy);

        let task = snapshot.task;
        self.display.reset();
        self.stop_polling();

        Some(TimeEntry {
            task_id: task.task_id,
            task_name: task.task_name,
            project_id: task.project_id,
            seconds,
            recorded_at: self.engine.clock().now_ms(),
        })
    }

    fn sync_polling(&mut self) {
        if self.display.phase == UiPhase::Running && self.app_state == AppState::Active {
            self.start_polling();
        } else {
            self.stop_polling();
        }
    }

    fn start_polling(&mut self) {
        if self.ticker.is_none() {
            let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            self.ticker = Some(ticker);
        }
    }

    fn stop_polling(&mut self) {
        self.ticker = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
