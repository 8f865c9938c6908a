//! Notification delegate implementation.
//!
//! Implements `UNUserNotificationCenterDelegate` so that tapping the live
//! timer notification forwards its routing payload to the app.

use block2::Block;
use crossbeam_channel::Sender;
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_foundation::{NSObject, NSObjectProtocol, NSString};
use objc2_user_notifications::{
    UNNotification, UNNotificationPresentationOptions, UNNotificationResponse,
    UNUserNotificationCenter, UNUserNotificationCenterDelegate,
};

use super::content::PAYLOAD_KEY;
use crate::notification::routing::NotificationPayload;

/// Action identifier the system reports for a plain tap.
const DEFAULT_ACTION_ID: &str = "com.apple.UNNotificationDefaultActionIdentifier";

/// Instance variables for the notification delegate.
pub struct NotificationDelegateIvars {
    /// Channel sender for tapped notification payloads.
    pub tap_sender: Sender<NotificationPayload>,
}

define_class!(
    /// Delegate that forwards notification taps.
    // SAFETY:
    // - The superclass NSObject does not have any subclassing requirements.
    // - `NotificationDelegate` does not implement `Drop`.
    #[unsafe(super(NSObject))]
    #[ivars = NotificationDelegateIvars]
    #[name = "TaskTimerNotificationDelegate"]
    #[thread_kind = MainThreadOnly]
    pub struct NotificationDelegate;

    impl NotificationDelegate {}

    unsafe impl NSObjectProtocol for NotificationDelegate {}

    unsafe impl UNUserNotificationCenterDelegate for NotificationDelegate {
        /// Keeps the live notification visible while the app is in front.
        #[unsafe(method(userNotificationCenter:willPresentNotification:withCompletionHandler:))]
        fn will_present_notification(
            &self,
            _center: &UNUserNotificationCenter,
            _notification: &UNNotification,
            completion_handler: &Block<dyn Fn(UNNotificationPresentationOptions)>,
        ) {
            let options = UNNotificationPresentationOptions::Banner
                | UNNotificationPresentationOptions::List;

            completion_handler.call((options,));
        }

        #[unsafe(method(userNotificationCenter:didReceiveNotificationResponse:withCompletionHandler:))]
        fn did_receive_notification_response(
            &self,
            _center: &UNUserNotificationCenter,
            response: &UNNotificationResponse,
            completion_handler: &Block<dyn Fn()>,
        ) {
            if response.actionIdentifier().to_string() == DEFAULT_ACTION_ID {
                match payload_of(response) {
                    Some(payload) => {
                        let _ = self.ivars().tap_sender.send(payload);
                    }
                    None => tracing::warn!("Tapped notification carries no routing payload"),
                }
            }

            completion_handler.call(());
        }
    }
);

/// Reads the routing payload from a notification response's user info.
fn payload_of(response: &UNNotificationResponse) -> Option<NotificationPayload> {
    let user_info = response.notification().request().content().userInfo();
    let key = NSString::from_str(PAYLOAD_KEY);
    let value = user_info.objectForKey(&key)?;
    let json = value.downcast::<NSString>().ok()?;
    NotificationPayload::from_json(&json.to_string())
}

impl NotificationDelegate {
    /// Creates a new notification delegate.
    ///
    /// # Arguments
    /// * `mtm` - Main thread marker to ensure we're on the main thread
    /// * `tap_sender` - Channel sender for tapped payloads
    #[must_use]
    pub fn new(mtm: MainThreadMarker, tap_sender: Sender<NotificationPayload>) -> Retained<Self> {
        let ivars = NotificationDelegateIvars { tap_sender };
        let this = Self::alloc(mtm).set_ivars(ivars);
        unsafe { msg_send![super(this), init] }
    }

    /// Converts a retained delegate to a protocol object.
    #[must_use]
    pub fn as_protocol(
        delegate: &Retained<Self>,
    ) -> Retained<ProtocolObject<dyn UNUserNotificationCenterDelegate>> {
        ProtocolObject::from_retained(delegate.clone())
    }
}
