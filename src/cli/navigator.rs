//! Terminal navigation target for tapped notifications.

use crate::notification::{NavigationError, Navigator, Route};

use super::display::Display;

/// Navigator for the `watch` screen.
///
/// The terminal only ever shows one task, so a tap for any other task
/// cannot be honoured and falls back to home.
#[derive(Debug, Clone)]
pub struct TerminalNavigator {
    task_id: String,
}

impl TerminalNavigator {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &Route) -> Result<(), NavigationError> {
        if let Route::Task { task_id, .. } = route {
            if *task_id != self.task_id {
                return Err(NavigationError {
                    route: format!("task {}", task_id),
                    reason: format!("this screen is watching task {}", self.task_id),
                });
            }
        }
        Display::show_route(route);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{NotificationAction, NotificationPayload, NotificationRouter};

    fn task_route(task_id: &str) -> Route {
        Route::Task {
            task_id: task_id.to_string(),
            project_id: "p".to_string(),
        }
    }

    #[test]
    fn test_navigates_to_watched_task() {
        let navigator = TerminalNavigator::new("t-1");
        assert!(navigator.navigate(&task_route("t-1")).is_ok());
        assert!(navigator.navigate(&Route::Home).is_ok());
    }

    #[test]
    fn test_rejects_other_task() {
        let navigator = TerminalNavigator::new("t-1");
        let err = navigator.navigate(&task_route("t-2")).unwrap_err();
        assert!(err.reason.contains("t-1"));
    }

    #[test]
    fn test_router_falls_back_home_for_other_task() {
        let router = NotificationRouter::new(TerminalNavigator::new("t-1"));
        let payload = NotificationPayload::new(
            "t-2",
            Some("p".to_string()),
            NotificationAction::Running,
        );
        assert_eq!(router.handle_tap(&payload), Route::Home);

        let payload = NotificationPayload::new(
            "t-1",
            Some("p".to_string()),
            NotificationAction::Paused,
        );
        assert_eq!(router.handle_tap(&payload), task_route("t-1"));
    }
}
