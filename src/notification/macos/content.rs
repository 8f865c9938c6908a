//! Native notification content construction.

use objc2::rc::Retained;
use objc2_foundation::{NSDictionary, NSString};
use objc2_user_notifications::UNMutableNotificationContent;

use crate::notification::content::NotificationContent;

/// User-info key under which the routing payload JSON is stored.
pub const PAYLOAD_KEY: &str = "tasktimer.payload";

/// Thread identifier grouping all timer notifications.
const THREAD_ID: &str = "tasktimer.timer";

/// Builder for constructing native notification content.
pub struct NotificationContentBuilder {
    content: Retained<UNMutableNotificationContent>,
}

impl NotificationContentBuilder {
    #[must_use]
    pub fn new() -> Self {
        let content = unsafe { UNMutableNotificationContent::new() };
        Self { content }
    }

    #[must_use]
    pub fn title(self, title: &str) -> Self {
        let title = NSString::from_str(title);
        unsafe {
            self.content.setTitle(&title);
        }
        self
    }

    #[must_use]
    pub fn body(self, body: &str) -> Self {
        let body = NSString::from_str(body);
        unsafe {
            self.content.setBody(&body);
        }
        self
    }

    #[must_use]
    pub fn thread_identifier(self, thread_id: &str) -> Self {
        let thread_id = NSString::from_str(thread_id);
        unsafe {
            self.content.setThreadIdentifier(&thread_id);
        }
        self
    }

    /// Stores the routing payload JSON in the notification's user info.
    #[must_use]
    pub fn payload(self, json: &str) -> Self {
        let key = NSString::from_str(PAYLOAD_KEY);
        let value = NSString::from_str(json);
        let user_info: Retained<NSDictionary<NSString, NSString>> =
            NSDictionary::from_slices(&[&*key], &[&*value]);
        // SAFETY: NSString keys and values are valid property-list objects.
        let user_info: Retained<NSDictionary> = unsafe { Retained::cast_unchecked(user_info) };
        unsafe {
            self.content.setUserInfo(&user_info);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Retained<UNMutableNotificationContent> {
        self.content
    }
}

impl Default for NotificationContentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts platform-independent content into a native content object.
///
/// No sound is attached: the notification is refreshed every tick.
#[must_use]
pub fn create_native_content(content: &NotificationContent) -> Retained<UNMutableNotificationContent> {
    NotificationContentBuilder::new()
        .title(&content.title)
        .body(&content.body)
        .thread_identifier(THREAD_ID)
        .payload(&content.payload.to_json())
        .build()
}
