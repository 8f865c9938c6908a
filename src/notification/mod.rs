//! Live timer notification gateway.
//!
//! This module owns the single OS-level notification that mirrors the
//! running timer. It includes:
//!
//! - The [`NotificationGateway`] trait (schedule / update / mark paused /
//!   dismiss, plus tap delivery)
//! - Platform-independent content and routing metadata
//! - Native macOS notifications via `objc2-user-notifications`
//! - A logging fallback used when native notifications are unavailable
//!
//! # Example
//!
//! ```rust,ignore
//! use tasktimer::notification::{create_gateway, NotificationGateway};
//! use tasktimer::types::TaskRef;
//!
//! let gateway = create_gateway(true).await;
//! let task = TaskRef::new("API design", "task-1", None);
//! let id = gateway.schedule(&task).await?;
//! gateway.update(&id, &task, "00:01:00").await?;
//! gateway.dismiss(&id).await?;
//! ```
//!
//! # Error Handling
//!
//! Every gateway failure is recoverable. The timer engine logs the error
//! and keeps going; elapsed time never depends on notification success.

pub mod content;
pub mod error;
pub mod routing;

#[cfg(target_os = "macos")]
mod macos;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};
use uuid::Uuid;

pub use self::content::{validate_task_name, NotificationContent};
pub use self::error::NotificationError;
#[cfg(target_os = "macos")]
pub use self::macos::UserNotificationGateway;
pub use self::routing::{
    MockNavigator, NavigationError, Navigator, NotificationAction, NotificationPayload,
    NotificationRouter, Route,
};

use crate::types::TaskRef;

/// Time shown on a freshly scheduled notification.
pub const INITIAL_TIME: &str = "00:00:00";

/// Schedules, updates and dismisses the live timer notification.
#[allow(async_fn_in_trait)]
pub trait NotificationGateway {
    /// Posts a new persistent notification showing `"<task> - 00:00:00"`.
    ///
    /// Returns the identifier used for later updates.
    async fn schedule(&self, task: &TaskRef) -> Result<String, NotificationError>;

    /// Replaces the content of notification `id` in place.
    async fn update(&self, id: &str, task: &TaskRef, time: &str) -> Result<(), NotificationError>;

    /// Replaces notification `id` with paused-state content.
    async fn mark_paused(
        &self,
        id: &str,
        task: &TaskRef,
        time: &str,
    ) -> Result<(), NotificationError>;

    /// Removes notification `id`. Succeeds if it is already gone.
    async fn dismiss(&self, id: &str) -> Result<(), NotificationError>;

    /// Returns the routing payload of a tapped notification, if one is pending.
    fn try_recv_tap(&self) -> Option<NotificationPayload>;
}

impl<T: NotificationGateway> NotificationGateway for Arc<T> {
    async fn schedule(&self, task: &TaskRef) -> Result<String, NotificationError> {
        (**self).schedule(task).await
    }

    async fn update(&self, id: &str, task: &TaskRef, time: &str) -> Result<(), NotificationError> {
        (**self).update(id, task, time).await
    }

    async fn mark_paused(
        &self,
        id: &str,
        task: &TaskRef,
        time: &str,
    ) -> Result<(), NotificationError> {
        (**self).mark_paused(id, task, time).await
    }

    async fn dismiss(&self, id: &str) -> Result<(), NotificationError> {
        (**self).dismiss(id).await
    }

    fn try_recv_tap(&self) -> Option<NotificationPayload> {
        (**self).try_recv_tap()
    }
}

// ============================================================================
// LogNotificationGateway
// ============================================================================

/// Fallback gateway that reports notification content through `tracing`.
///
/// Used when native notifications are disabled or unavailable. It keeps
/// track of live identifiers so update/dismiss semantics match the native
/// gateway.
#[derive(Debug, Default)]
pub struct LogNotificationGateway {
    live: Mutex<HashMap<String, NotificationContent>>,
}

impl LogNotificationGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn post(&self, id: &str, content: NotificationContent) {
        debug!("Notification {}: {} | {}", id, content.title, content.body);
        self.live.lock().unwrap().insert(id.to_string(), content);
    }

    /// Returns the current content of notification `id`.
    #[must_use]
    pub fn content(&self, id: &str) -> Option<NotificationContent> {
        self.live.lock().unwrap().get(id).cloned()
    }
}

impl NotificationGateway for LogNotificationGateway {
    async fn schedule(&self, task: &TaskRef) -> Result<String, NotificationError> {
        let id = Uuid::new_v4().to_string();
        let content = NotificationContent::running(task, INITIAL_TIME);
        info!("Timer notification scheduled: {}", content.title);
        self.post(&id, content);
        Ok(id)
    }

    async fn update(&self, id: &str, task: &TaskRef, time: &str) -> Result<(), NotificationError> {
        self.post(id, NotificationContent::running(task, time));
        Ok(())
    }

    async fn mark_paused(
        &self,
        id: &str,
        task: &TaskRef,
        time: &str,
    ) -> Result<(), NotificationError> {
        self.post(id, NotificationContent::paused(task, time));
        Ok(())
    }

    async fn dismiss(&self, id: &str) -> Result<(), NotificationError> {
        if self.live.lock().unwrap().remove(id).is_some() {
            info!("Timer notification {} dismissed", id);
        }
        Ok(())
    }

    fn try_recv_tap(&self) -> Option<NotificationPayload> {
        None
    }
}

// ============================================================================
// Gateway selection
// ============================================================================

/// The gateway chosen for this platform at startup.
#[derive(Debug)]
pub enum DefaultGateway {
    #[cfg(target_os = "macos")]
    Native(UserNotificationGateway),
    Log(LogNotificationGateway),
}

/// Creates the best available gateway.
///
/// On macOS this requests notification authorization; if that fails, or
/// `enabled` is false, or the platform has no native support, the logging
/// gateway is returned instead.
pub async fn create_gateway(enabled: bool) -> DefaultGateway {
    if !enabled {
        debug!("Native notifications disabled by configuration");
        return DefaultGateway::Log(LogNotificationGateway::new());
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(gateway) = UserNotificationGateway::new_with_fallback().await {
            return DefaultGateway::Native(gateway);
        }
    }

    DefaultGateway::Log(LogNotificationGateway::new())
}

impl NotificationGateway for DefaultGateway {
    async fn schedule(&self, task: &TaskRef) -> Result<String, NotificationError> {
        match self {
            #[cfg(target_os = "macos")]
            Self::Native(g) => g.schedule(task).await,
            Self::Log(g) => g.schedule(task).await,
        }
    }

    async fn update(&self, id: &str, task: &TaskRef, time: &str) -> Result<(), NotificationError> {
        match self {
            #[cfg(target_os = "macos")]
            Self::Native(g) => g.update(id, task, time).await,
            Self::Log(g) => g.update(id, task, time).await,
        }
    }

    async fn mark_paused(
        &self,
        id: &str,
        task: &TaskRef,
        time: &str,
    ) -> Result<(), NotificationError> {
        match self {
            #[cfg(target_os = "macos")]
            Self::Native(g) => g.mark_paused(id, task, time).await,
            Self::Log(g) => g.mark_paused(id, task, time).await,
        }
    }

    async fn dismiss(&self, id: &str) -> Result<(), NotificationError> {
        match self {
            #[cfg(target_os = "macos")]
            Self::Native(g) => g.dismiss(id).await,
            Self::Log(g) => g.dismiss(id).await,
        }
    }

    fn try_recv_tap(&self) -> Option<NotificationPayload> {
        match self {
            #[cfg(target_os = "macos")]
            Self::Native(g) => g.try_recv_tap(),
            Self::Log(g) => g.try_recv_tap(),
        }
    }
}

// ============================================================================
// MockNotificationGateway
// ============================================================================

/// A gateway call recorded by [`MockNotificationGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Schedule { id: String },
    Update { id: String, time: String },
    MarkPaused { id: String, time: String },
    Dismiss { id: String },
}

#[derive(Debug)]
pub struct MockNotificationGateway {
    active: Mutex<HashMap<String, NotificationContent>>,
    calls: Mutex<Vec<GatewayCall>>,
    should_fail: AtomicBool,
    tap_tx: Sender<NotificationPayload>,
    tap_rx: Receiver<NotificationPayload>,
}

impl Default for MockNotificationGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotificationGateway {
    #[must_use]
    pub fn new() -> Self {
        let (tap_tx, tap_rx) = crossbeam_channel::unbounded();
        Self {
            active: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
            tap_tx,
            tap_rx,
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Simulates the user tapping a notification.
    pub fn inject_tap(&self, payload: NotificationPayload) {
        let _ = self.tap_tx.send(payload);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of notifications currently shown.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// Current content of notification `id`.
    #[must_use]
    pub fn content(&self, id: &str) -> Option<NotificationContent> {
        self.active.lock().unwrap().get(id).cloned()
    }

    pub fn clear_recorded(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn check(&self) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        Ok(())
    }
}

impl NotificationGateway for MockNotificationGateway {
    async fn schedule(&self, task: &TaskRef) -> Result<String, NotificationError> {
        self.check()?;
        let id = Uuid::new_v4().to_string();
        self.active
            .lock()
            .unwrap()
            .insert(id.clone(), NotificationContent::running(task, INITIAL_TIME));
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::Schedule { id: id.clone() });
        Ok(id)
    }

    async fn update(&self, id: &str, task: &TaskRef, time: &str) -> Result<(), NotificationError> {
        self.check()?;
        self.active
            .lock()
            .unwrap()
            .insert(id.to_string(), NotificationContent::running(task, time));
        self.calls.lock().unwrap().push(GatewayCall::Update {
            id: id.to_string(),
            time: time.to_string(),
        });
        Ok(())
    }

    async fn mark_paused(
        &self,
        id: &str,
        task: &TaskRef,
        time: &str,
    ) -> Result<(), NotificationError> {
        self.check()?;
        self.active
            .lock()
            .unwrap()
            .insert(id.to_string(), NotificationContent::paused(task, time));
        self.calls.lock().unwrap().push(GatewayCall::MarkPaused {
            id: id.to_string(),
            time: time.to_string(),
        });
        Ok(())
    }

    async fn dismiss(&self, id: &str) -> Result<(), NotificationError> {
        self.check()?;
        self.active.lock().unwrap().remove(id);
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::Dismiss { id: id.to_string() });
        Ok(())
    }

    fn try_recv_tap(&self) -> Option<NotificationPayload> {
        self.tap_rx.try_recv().ok()
    }
}
