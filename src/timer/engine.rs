//! Timer engine for the task timer.
//!
//! This module provides the core state machine:
//! - State transitions (Idle → Running ⇄ Paused → Idle)
//! - Elapsed time derived from the persisted start timestamp
//! - Mediation between the durable store and the notification gateway
//!
//! The engine keeps no counter of its own. Every operation re-reads the
//! store, so a freshly started process sees exactly what the previous one
//! left behind. Failures are logged and turned into sentinel values; only a
//! failed initial write makes `start` report [`StartOutcome::Failed`].

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::notification::NotificationGateway;
use crate::store::TimerStore;
use crate::types::{
    seconds_to_display, ElapsedTime, StartOutcome, TaskRef, TimerSession, TimerSnapshot,
    TimerStatus,
};

// ============================================================================
// TimerEngine
// ============================================================================

/// The timer state machine over a store, a notification gateway and a clock.
#[derive(Debug)]
pub struct TimerEngine<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
}

impl<S, N, C> TimerEngine<S, N, C>
where
    S: TimerStore,
    N: NotificationGateway,
    C: Clock,
{
    /// Creates a new engine.
    pub fn new(store: S, notifier: N, clock: C) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Reads the session, treating a failed read as idle.
    async fn load(&self) -> Option<TimerSession> {
        match self.store.read().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to read timer session, treating as idle: {}", e);
                None
            }
        }
    }

    async fn save(&self, session: &TimerSession, op: &str) -> bool {
        match self.store.write(session).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist timer session on {}: {}", op, e);
                false
            }
        }
    }

    /// Starts timing `task`.
    ///
    /// Only valid from Idle; an existing session is left untouched and
    /// [`StartOutcome::AlreadyActive`] is returned.
    pub async fn start(&self, task: TaskRef) -> StartOutcome {
        if let Some(existing) = self.load().await {
            info!(
                "Timer already {} for task {}; start ignored",
                existing.status(),
                existing.task_id
            );
            return StartOutcome::AlreadyActive;
        }

        let mut session = TimerSession::start(task, self.clock.now_ms());
        if let Err(e) = self.store.write(&session).await {
            tracing::error!("Failed to persist new timer session: {}", e);
            return StartOutcome::Failed;
        }

        let notification_id = match self.notifier.schedule(&session.task()).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Failed to schedule timer notification: {}", e);
                None
            }
        };

        if notification_id.is_some() {
            session.notification_id = notification_id.clone();
            self.save(&session, "start").await;
        }

        info!("Timer started for task {}", session.task_id);
        StartOutcome::Started { notification_id }
    }

    /// Pauses a running timer, returning the frozen elapsed seconds.
    ///
    /// Returns `None` (no-op) unless the timer is Running.
    pub async fn pause(&self) -> Option<u64> {
        let mut session = match self.load().await {
            Some(s) if s.is_running => s,
            _ => {
                debug!("Pause ignored: timer is not running");
                return None;
            }
        };

        let elapsed = session.pause_at(self.clock.now_ms());
        self.save(&session, "pause").await;

        if let Some(id) = session.notification_id.as_deref() {
            if let Err(e) = self
                .notifier
                .mark_paused(id, &session.task(), &seconds_to_display(elapsed))
                .await
            {
                warn!("Failed to mark notification paused: {}", e);
            }
        }

        info!("Timer paused at {}", seconds_to_display(elapsed));
        Some(elapsed)
    }

    /// Resumes a paused timer, returning the elapsed seconds carried over.
    ///
    /// Returns `None` (no-op) unless the timer is Paused.
    pub async fn resume(&self) -> Option<u64> {
        let mut session = match self.load().await {
            Some(s) if !s.is_running => s,
            _ => {
                debug!("Resume ignored: timer is not paused");
                return None;
            }
        };

        let elapsed = session.resume_at(self.clock.now_ms());
        self.save(&session, "resume").await;

        if let Some(id) = session.notification_id.as_deref() {
            if let Err(e) = self
                .notifier
                .update(id, &session.task(), &seconds_to_display(elapsed))
                .await
            {
                warn!("Failed to update notification on resume: {}", e);
            }
        }

        info!("Timer resumed at {}", seconds_to_display(elapsed));
        Some(elapsed)
    }

    /// Stops the timer, returning the final elapsed seconds.
    ///
    /// The session is always removed; `0` is returned when there was none.
    pub async fn stop(&self) -> u64 {
        let Some(session) = self.load().await else {
            debug!("Stop with no active session");
            return 0;
        };

        let elapsed = session.elapsed_at(self.clock.now_ms());

        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear timer session on stop: {}", e);
        }

        if let Some(id) = session.notification_id.as_deref() {
            if let Err(e) = self.notifier.dismiss(id).await {
                warn!("Failed to dismiss timer notification: {}", e);
            }
        }

        info!(
            "Timer stopped for task {} after {}",
            session.task_id,
            seconds_to_display(elapsed)
        );
        elapsed
    }

    /// Returns the current elapsed time, or `None` when idle.
    ///
    /// Never mutates state.
    pub async fn get_current_time(&self) -> Option<ElapsedTime> {
        let session = self.load().await?;
        Some(ElapsedTime::from_seconds(
            session.elapsed_at(self.clock.now_ms()),
        ))
    }

    /// Returns true if a session exists and is counting.
    pub async fn is_running(&self) -> bool {
        self.load().await.is_some_and(|s| s.is_running)
    }

    pub async fn status(&self) -> TimerStatus {
        self.load()
            .await
            .map_or(TimerStatus::Idle, |s| s.status())
    }

    /// Returns a consistent view of the session from a single read.
    pub async fn snapshot(&self) -> Option<TimerSnapshot> {
        let session = self.load().await?;
        Some(TimerSnapshot {
            status: session.status(),
            elapsed: ElapsedTime::from_seconds(session.elapsed_at(self.clock.now_ms())),
            task: session.task(),
            notification_id: session.notification_id,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::notification::{GatewayCall, MockNotificationGateway, NotificationAction};
    use crate::store::MemoryTimerStore;

    const T0: i64 = 1_700_000_000_000;

    type TestEngine =
        TimerEngine<Arc<MemoryTimerStore>, Arc<MockNotificationGateway>, ManualClock>;

    fn create_engine() -> (
        TestEngine,
        Arc<MemoryTimerStore>,
        Arc<MockNotificationGateway>,
        ManualClock,
    ) {
        let store = Arc::new(MemoryTimerStore::new());
        let notifier = Arc::new(MockNotificationGateway::new());
        let clock = ManualClock::new(T0);
        let engine = TimerEngine::new(Arc::clone(&store), Arc::clone(&notifier), clock.clone());
        (engine, store, notifier, clock)
    }

    fn task() -> TaskRef {
        TaskRef::new("Write report", "task-1", Some("proj-1".to_string()))
    }

    // ------------------------------------------------------------------------
    // Start
    // ------------------------------------------------------------------------

    mod start_tests {
        use super::*;

        #[tokio::test]
        async fn test_start_persists_running_session() {
            let (engine, store, notifier, _clock) = create_engine();

            let outcome = engine.start(task()).await;
            assert!(outcome.is_started());

            let session = store.snapshot().unwrap();
            assert!(session.is_running);
            assert_eq!(session.start_time, T0);
            assert_eq!(session.elapsed_time, 0);
            assert_eq!(session.notification_id.as_deref(), outcome.notification_id());
            assert_eq!(notifier.active_count(), 1);
        }

        #[tokio::test]
        async fn test_start_shows_initial_time() {
            let (engine, _store, notifier, _clock) = create_engine();
            let outcome = engine.start(task()).await;

            let id = outcome.notification_id().unwrap();
            let content = notifier.content(id).unwrap();
            assert_eq!(content.title, "Write report - 00:00:00");
            assert_eq!(content.action(), NotificationAction::Running);
        }

        #[tokio::test]
        async fn test_no_double_session() {
            let (engine, store, notifier, clock) = create_engine();
            engine.start(task()).await;
            let original = store.snapshot().unwrap();

            clock.advance_secs(10);
            let outcome = engine
                .start(TaskRef::new("Other", "task-2", None))
                .await;

            assert_eq!(outcome, StartOutcome::AlreadyActive);
            assert_eq!(store.snapshot().unwrap(), original);
            assert_eq!(notifier.active_count(), 1);
        }

        #[tokio::test]
        async fn test_start_while_paused_is_noop() {
            let (engine, store, _notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_secs(5);
            engine.pause().await;

            assert_eq!(engine.start(task()).await, StartOutcome::AlreadyActive);
            assert_eq!(store.snapshot().unwrap().elapsed_time, 5);
        }

        #[tokio::test]
        async fn test_start_write_failure_fails() {
            let (engine, store, notifier, _clock) = create_engine();
            store.set_fail_writes(true);

            assert_eq!(engine.start(task()).await, StartOutcome::Failed);
            assert!(store.snapshot().is_none());
            assert!(notifier.calls().is_empty());
        }

        #[tokio::test]
        async fn test_start_notification_failure_is_non_fatal() {
            let (engine, store, notifier, _clock) = create_engine();
            notifier.set_should_fail(true);

            let outcome = engine.start(task()).await;
            assert_eq!(
                outcome,
                StartOutcome::Started {
                    notification_id: None
                }
            );
            assert!(store.snapshot().unwrap().is_running);
        }

        #[tokio::test]
        async fn test_start_read_failure_treated_as_idle() {
            let (engine, store, _notifier, _clock) = create_engine();
            store.set_fail_reads(true);

            assert!(engine.start(task()).await.is_started());
            assert!(store.snapshot().is_some());
        }
    }

    // ------------------------------------------------------------------------
    // Pause / Resume
    // ------------------------------------------------------------------------

    mod pause_resume_tests {
        use super::*;

        #[tokio::test]
        async fn test_pause_freezes_elapsed() {
            let (engine, store, notifier, clock) = create_engine();
            let id = engine.start(task()).await.notification_id().unwrap().to_string();

            clock.advance_ms(5_400);
            assert_eq!(engine.pause().await, Some(5));

            let session = store.snapshot().unwrap();
            assert!(!session.is_running);
            assert_eq!(session.elapsed_time, 5);

            let content = notifier.content(&id).unwrap();
            assert_eq!(content.action(), NotificationAction::Paused);
            assert_eq!(content.title, "Write report - 00:00:05");
        }

        #[tokio::test]
        async fn test_pause_when_idle_or_paused_is_noop() {
            let (engine, store, _notifier, clock) = create_engine();
            assert_eq!(engine.pause().await, None);

            engine.start(task()).await;
            clock.advance_secs(5);
            engine.pause().await;
            let writes = store.write_count();

            clock.advance_secs(50);
            assert_eq!(engine.pause().await, None);
            assert_eq!(store.write_count(), writes);
            assert_eq!(store.snapshot().unwrap().elapsed_time, 5);
        }

        #[tokio::test]
        async fn test_resume_reanchors_start_time() {
            let (engine, store, notifier, clock) = create_engine();
            let id = engine.start(task()).await.notification_id().unwrap().to_string();
            clock.set_ms(T0 + 5_000);
            engine.pause().await;

            clock.set_ms(T0 + 105_000);
            assert_eq!(engine.resume().await, Some(5));

            let session = store.snapshot().unwrap();
            assert!(session.is_running);
            assert_eq!(session.start_time, T0 + 100_000);
            assert_eq!(
                notifier.content(&id).unwrap().action(),
                NotificationAction::Running
            );
        }

        #[tokio::test]
        async fn test_resume_when_running_is_noop() {
            let (engine, store, _notifier, _clock) = create_engine();
            assert_eq!(engine.resume().await, None);

            engine.start(task()).await;
            let before = store.snapshot();
            assert_eq!(engine.resume().await, None);
            assert_eq!(store.snapshot(), before);
        }

        #[tokio::test]
        async fn test_pause_write_failure_still_returns_elapsed() {
            let (engine, store, _notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_secs(7);
            store.set_fail_writes(true);

            assert_eq!(engine.pause().await, Some(7));
            // the persisted record keeps running; only background accuracy suffers
            assert!(store.snapshot().unwrap().is_running);
        }

        #[tokio::test]
        async fn test_pause_notification_failure_is_non_fatal() {
            let (engine, store, notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_secs(3);
            notifier.set_should_fail(true);

            assert_eq!(engine.pause().await, Some(3));
            assert!(!store.snapshot().unwrap().is_running);
        }
    }

    // ------------------------------------------------------------------------
    // Stop
    // ------------------------------------------------------------------------

    mod stop_tests {
        use super::*;

        #[tokio::test]
        async fn test_stop_without_session_returns_zero() {
            let (engine, _store, notifier, _clock) = create_engine();
            assert_eq!(engine.stop().await, 0);
            assert!(notifier.calls().is_empty());
        }

        #[tokio::test]
        async fn test_stop_running() {
            let (engine, store, notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_ms(42_999);

            assert_eq!(engine.stop().await, 42);
            assert!(store.snapshot().is_none());
            assert_eq!(notifier.active_count(), 0);
        }

        #[tokio::test]
        async fn test_stop_paused_ignores_paused_interval() {
            let (engine, _store, _notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_secs(12);
            engine.pause().await;
            clock.advance_secs(3_600);

            assert_eq!(engine.stop().await, 12);
        }

        #[tokio::test]
        async fn test_stop_returns_elapsed_once() {
            let (engine, _store, _notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_secs(9);

            assert_eq!(engine.stop().await, 9);
            assert_eq!(engine.stop().await, 0);
        }

        #[tokio::test]
        async fn test_stop_dismisses_notification() {
            let (engine, _store, notifier, _clock) = create_engine();
            let id = engine.start(task()).await.notification_id().unwrap().to_string();

            engine.stop().await;
            assert!(notifier.calls().contains(&GatewayCall::Dismiss { id }));
        }

        #[tokio::test]
        async fn test_stop_clear_failure_still_returns_elapsed() {
            let (engine, store, _notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_secs(4);
            store.set_fail_writes(true);

            assert_eq!(engine.stop().await, 4);
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_idle_queries() {
            let (engine, _store, _notifier, _clock) = create_engine();
            assert!(!engine.is_running().await);
            assert_eq!(engine.get_current_time().await, None);
            assert_eq!(engine.status().await, TimerStatus::Idle);
            assert!(engine.snapshot().await.is_none());
        }

        #[tokio::test]
        async fn test_get_current_time_running() {
            let (engine, _store, _notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_secs(3_661);

            let time = engine.get_current_time().await.unwrap();
            assert_eq!(time.to_string(), "01:01:01");
            assert!(engine.is_running().await);
        }

        #[tokio::test]
        async fn test_get_current_time_does_not_mutate() {
            let (engine, store, _notifier, clock) = create_engine();
            engine.start(task()).await;
            let writes = store.write_count();

            clock.advance_secs(30);
            engine.get_current_time().await;
            engine.snapshot().await;
            assert_eq!(store.write_count(), writes);
        }

        #[tokio::test]
        async fn test_snapshot_paused() {
            let (engine, _store, _notifier, clock) = create_engine();
            engine.start(task()).await;
            clock.advance_secs(20);
            engine.pause().await;
            clock.advance_secs(100);

            let snapshot = engine.snapshot().await.unwrap();
            assert_eq!(snapshot.status, TimerStatus::Paused);
            assert_eq!(snapshot.elapsed.total_seconds(), 20);
            assert_eq!(snapshot.task, task());
            assert!(!engine.is_running().await);
        }

        #[tokio::test]
        async fn test_read_failure_reports_idle() {
            let (engine, store, _notifier, _clock) = create_engine();
            engine.start(task()).await;
            store.set_fail_reads(true);

            assert!(!engine.is_running().await);
            assert_eq!(engine.get_current_time().await, None);
            assert_eq!(engine.stop().await, 0);
        }
    }

    // ------------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------------

    mod scenario_tests {
        use super::*;

        #[tokio::test]
        async fn test_pause_resume_scenario() {
            let (engine, store, _notifier, clock) = create_engine();
            engine.start(task()).await;

            clock.set_ms(T0 + 5_000);
            engine.pause().await;
            assert_eq!(store.snapshot().unwrap().elapsed_time, 5);

            clock.set_ms(T0 + 105_000);
            engine.resume().await;
            assert_eq!(store.snapshot().unwrap().start_time, T0 + 100_000);

            clock.set_ms(T0 + 108_000);
            assert_eq!(engine.stop().await, 8);
        }

        #[tokio::test]
        async fn test_continuity_over_many_cycles() {
            let (engine, _store, _notifier, clock) = create_engine();
            engine.start(task()).await;

            let mut expected = 0;
            for (run, idle) in [(4, 60), (10, 1), (0, 500), (7, 3)] {
                clock.advance_secs(run);
                expected += run as u64;
                engine.pause().await;
                clock.advance_secs(idle);
                engine.resume().await;
            }
            clock.advance_secs(2);
            expected += 2;

            assert_eq!(engine.stop().await, expected);
        }

        #[tokio::test]
        async fn test_idle_after_stop_from_every_state() {
            for pause_first in [false, true] {
                let (engine, _store, _notifier, clock) = create_engine();
                engine.start(task()).await;
                clock.advance_secs(1);
                if pause_first {
                    engine.pause().await;
                }

                engine.stop().await;
                assert!(!engine.is_running().await);
                assert_eq!(engine.get_current_time().await, None);
            }
        }
    }
}
