//! Native macOS notifications.
//!
//! The live timer notification is a `UNNotificationRequest` whose identifier
//! is the notification id stored in the timer session. Updating re-adds a
//! request with the same identifier, which replaces the delivered
//! notification rather than stacking a new one.
//!
//! # Requirements
//!
//! - macOS 10.14+
//! - The binary must be code-signed for notifications to work properly
//!
//! ```bash
//! codesign --force --deep --sign - target/release/tasktimer
//! ```

mod center;
mod content;
mod delegate;
mod request;

use std::fmt;

use crossbeam_channel::Receiver;
use objc2::rc::Retained;
use objc2::MainThreadMarker;
use uuid::Uuid;

use self::center::NotificationCenter;
use self::content::create_native_content;
use self::delegate::NotificationDelegate;
use self::request::create_notification_request_with_id;
use super::content::NotificationContent;
use super::error::NotificationError;
use super::routing::NotificationPayload;
use super::{NotificationGateway, INITIAL_TIME};
use crate::types::TaskRef;

/// Gateway backed by `UNUserNotificationCenter`.
pub struct UserNotificationGateway {
    /// Receiver for taps forwarded by the delegate.
    tap_receiver: Receiver<NotificationPayload>,
    /// Retained delegate to keep it alive.
    _delegate: Retained<NotificationDelegate>,
}

impl UserNotificationGateway {
    /// Requests authorization and installs the tap delegate.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Authorization is denied
    /// - Not running on the main thread
    /// - System notification center is unavailable
    pub async fn new() -> Result<Self, NotificationError> {
        let mtm = MainThreadMarker::new().ok_or_else(|| {
            NotificationError::InitializationFailed(
                "notifications must be initialized on the main thread".to_string(),
            )
        })?;

        let granted = NotificationCenter::request_authorization().await?;
        if !granted {
            return Err(NotificationError::PermissionDenied);
        }

        let (sender, receiver) = crossbeam_channel::unbounded();
        let delegate = NotificationDelegate::new(mtm, sender);
        NotificationCenter::set_delegate(&NotificationDelegate::as_protocol(&delegate));

        Ok(Self {
            tap_receiver: receiver,
            _delegate: delegate,
        })
    }

    /// Creates the gateway, returning `None` (with the reason logged) if
    /// native notifications cannot be used.
    pub async fn new_with_fallback() -> Option<Self> {
        match Self::new().await {
            Ok(gateway) => Some(gateway),
            Err(NotificationError::PermissionDenied) => {
                tracing::warn!("Notification permission denied; live notifications disabled");
                tracing::info!("Allow them in System Settings > Notifications");
                None
            }
            Err(e) => {
                tracing::warn!("Failed to initialize notifications: {}", e);
                None
            }
        }
    }

    async fn post(&self, id: &str, content: &NotificationContent) -> Result<(), NotificationError> {
        let native = create_native_content(content);
        let request = create_notification_request_with_id(id, &native);
        NotificationCenter::add_notification_request(&request).await
    }
}

impl fmt::Debug for UserNotificationGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserNotificationGateway").finish_non_exhaustive()
    }
}

impl NotificationGateway for UserNotificationGateway {
    async fn schedule(&self, task: &TaskRef) -> Result<String, NotificationError> {
        let id = Uuid::new_v4().to_string();
        self.post(&id, &NotificationContent::running(task, INITIAL_TIME))
            .await?;
        Ok(id)
    }

    async fn update(&self, id: &str, task: &TaskRef, time: &str) -> Result<(), NotificationError> {
        self.post(id, &NotificationContent::running(task, time)).await
    }

    async fn mark_paused(
        &self,
        id: &str,
        task: &TaskRef,
        time: &str,
    ) -> Result<(), NotificationError> {
        self.post(id, &NotificationContent::paused(task, time)).await
    }

    async fn dismiss(&self, id: &str) -> Result<(), NotificationError> {
        NotificationCenter::remove_notification(id);
        Ok(())
    }

    fn try_recv_tap(&self) -> Option<NotificationPayload> {
        self.tap_receiver.try_recv().ok()
    }
}
