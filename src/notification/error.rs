//! Notification system error types.
//!
//! Every notification failure is non-fatal to the timer: callers log it and
//! carry on with correct timer state and degraded notification UX.

use thiserror::Error;

/// Errors that can occur in the notification gateway.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to request notification authorization from the system.
    #[error("notification authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Failed to post or replace a notification.
    #[error("failed to send notification: {0}")]
    SendFailed(String),

    /// Notification permission was denied by the user.
    #[error("notification permission denied")]
    PermissionDenied,

    /// Failed to initialize the notification system.
    #[error("failed to initialize notifications: {0}")]
    InitializationFailed(String),
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied | Self::AuthorizationFailed(_)
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AuthorizationFailed(_) | Self::PermissionDenied => {
                "Allow notifications for tasktimer in System Settings > Notifications"
            }
            Self::SendFailed(_) => "Check the notification center",
            Self::InitializationFailed(_) => "Restart the application",
        }
    }
}
