//! Background refresh task.
//!
//! Invoked periodically by the OS scheduler (see [`scheduler`]), usually in
//! a brand-new process. Each run reads the durable store, re-derives the
//! elapsed time of a running session and pushes it to the live
//! notification. Nothing survives between runs.
//!
//! The task only ever writes `elapsedTime`. `isRunning` and `startTime`
//! belong to the timer engine, so a refresh racing a user action cannot
//! corrupt the elapsed-time computation.

pub mod scheduler;

use std::fmt;

use tracing::{debug, error, warn};

pub use self::scheduler::{
    register_background_refresh, LaunchAgentScheduler, MockRefreshScheduler, RefreshScheduler,
    HOME_ENV,
};

use crate::clock::Clock;
use crate::notification::NotificationGateway;
use crate::store::TimerStore;
use crate::types::seconds_to_display;

/// Outcome of one refresh, for the host scheduler's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshResult {
    /// Idle or paused: nothing to do.
    NoData,
    /// A running session was refreshed.
    NewData,
    /// The store could not be read or written.
    Failed,
}

impl RefreshResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshResult::NoData => "no-data",
            RefreshResult::NewData => "new-data",
            RefreshResult::Failed => "failed",
        }
    }
}

impl fmt::Display for RefreshResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stateless background refresh over a store, gateway and clock.
#[derive(Debug)]
pub struct BackgroundRefresh<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
}

impl<S, N, C> BackgroundRefresh<S, N, C>
where
    S: TimerStore,
    N: NotificationGateway,
    C: Clock,
{
    pub fn new(store: S, notifier: N, clock: C) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Runs a single refresh.
    ///
    /// A notification failure is logged but does not fail the run: the
    /// store already holds the refreshed value.
    pub async fn run_once(&self) -> RefreshResult {
        let mut session = match self.store.read().await {
            Ok(Some(session)) if session.is_running => session,
            Ok(_) => {
                debug!("Background refresh: no running timer");
                return RefreshResult::NoData;
            }
            Err(e) => {
                error!("Background refresh could not read timer session: {}", e);
                return RefreshResult::Failed;
            }
        };

        let elapsed = session.elapsed_at(self.clock.now_ms());
        session.elapsed_time = elapsed;
        let display = seconds_to_display(elapsed);

        let persisted = match self.store.write(&session).await {
            Ok(()) => true,
            Err(e) => {
                error!("Background refresh could not persist elapsed time: {}", e);
                false
            }
        };

        if let Some(id) = session.notification_id.as_deref() {
            if let Err(e) = self.notifier.update(id, &session.task(), &display).await {
                warn!("Background refresh could not update notification: {}", e);
            }
        }

        let elapsed_display = &display;
        debug!("Background refresh: {} at {}", session.task_id, elapsed_display);
        if persisted {
            RefreshResult::NewData
        } else {
            RefreshResult::Failed
        }
    }
}
