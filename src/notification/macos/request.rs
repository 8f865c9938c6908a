//! Notification request creation.

use objc2::rc::Retained;
use objc2_foundation::NSString;
use objc2_user_notifications::{UNMutableNotificationContent, UNNotificationRequest};

/// Creates an immediate request with a caller-chosen identifier.
///
/// Reusing an identifier is how the live notification is updated in place.
#[must_use]
pub fn create_notification_request_with_id(
    identifier: &str,
    content: &UNMutableNotificationContent,
) -> Retained<UNNotificationRequest> {
    let identifier = NSString::from_str(identifier);

    UNNotificationRequest::requestWithIdentifier_content_trigger(&identifier, content, None)
}
