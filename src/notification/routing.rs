//! Tap-to-resume routing.
//!
//! Every timer notification carries a [`NotificationPayload`] naming the task
//! it belongs to. Tapping the notification hands the payload to a
//! [`NotificationRouter`], which asks a [`Navigator`] to open the task screen.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Timer state a notification was posted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationAction {
    Running,
    Paused,
}

/// Routing metadata embedded in a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub task_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub action: NotificationAction,
}

impl NotificationPayload {
    pub fn new(
        task_id: impl Into<String>,
        project_id: Option<String>,
        action: NotificationAction,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            project_id,
            action,
        }
    }

    /// Encodes the payload for a notification's user info.
    pub fn to_json(&self) -> String {
        // A struct of strings and a unit enum always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decodes a payload read back from a notification.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Ignoring malformed notification payload: {}", e);
                None
            }
        }
    }
}

/// A navigation destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The task screen for a task within a project.
    Task {
        task_id: String,
        project_id: String,
    },
    /// The root screen.
    Home,
}

impl Route {
    /// Resolves the destination for a tapped notification.
    ///
    /// Task screens live under their project, so a payload without a
    /// project routes home.
    pub fn for_payload(payload: &NotificationPayload) -> Self {
        match &payload.project_id {
            Some(project_id) => Route::Task {
                task_id: payload.task_id.clone(),
                project_id: project_id.clone(),
            },
            None => Route::Home,
        }
    }
}

/// Error returned when a navigation attempt fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("navigation to {route} failed: {reason}")]
pub struct NavigationError {
    pub route: String,
    pub reason: String,
}

/// Performs navigation in the host UI.
pub trait Navigator {
    fn navigate(&self, route: &Route) -> Result<(), NavigationError>;
}

/// Dispatches tapped notifications to a navigator.
#[derive(Debug)]
pub struct NotificationRouter<V> {
    navigator: V,
}

impl<V: Navigator> NotificationRouter<V> {
    pub fn new(navigator: V) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &V {
        &self.navigator
    }

    /// Handles a tap, returning the route that was actually taken.
    ///
    /// A failed task navigation falls back to [`Route::Home`]. A failure to
    /// reach home is logged and still reported as `Home`.
    pub fn handle_tap(&self, payload: &NotificationPayload) -> Route {
        let route = Route::for_payload(payload);
        debug!("Routing notification tap to {:?}", route);

        match self.navigator.navigate(&route) {
            Ok(()) => route,
            Err(e) if route != Route::Home => {
                warn!("{}; falling back to home", e);
                if let Err(e) = self.navigator.navigate(&Route::Home) {
                    warn!("{}", e);
                }
                Route::Home
            }
            Err(e) => {
                warn!("{}", e);
                Route::Home
            }
        }
    }
}

/// Mock navigator for testing.
#[derive(Debug, Default)]
pub struct MockNavigator {
    routes: std::sync::Mutex<Vec<Route>>,
    fail_task_routes: std::sync::atomic::AtomicBool,
}

impl MockNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes navigation to any task screen fail.
    pub fn set_fail_task_routes(&self, fail: bool) {
        self.fail_task_routes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    /// Routes successfully navigated to, in order.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for MockNavigator {
    fn navigate(&self, route: &Route) -> Result<(), NavigationError> {
        if matches!(route, Route::Task { .. })
            && self
                .fail_task_routes
                .load(std::sync::atomic::Ordering::SeqCst)
        {
            return Err(NavigationError {
                route: format!("{:?}", route),
                reason: "Mock failure".to_string(),
            });
        }
        self.routes.lock().unwrap().push(route.clone());
        Ok(())
    }
}
