//! Notification content construction.
//!
//! Platform-independent description of what the live timer notification
//! shows. Native gateways translate it into their own request types.

use super::routing::{NotificationAction, NotificationPayload};
use crate::types::TaskRef;

/// Maximum length for task names in notifications.
const MAX_TASK_NAME_LENGTH: usize = 100;

/// Shown when a task name sanitizes to nothing.
const UNTITLED_TASK: &str = "Untitled task";

const RUNNING_BODY: &str = "Timer running. Tap to return to your task.";
const PAUSED_BODY: &str = "Timer paused. Tap to resume your task.";

/// Content of the live timer notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// `"<task name> - HH:MM:SS"`
    pub title: String,
    pub body: String,
    /// Routing metadata for tap-to-resume
    pub payload: NotificationPayload,
}

impl NotificationContent {
    /// Content for a counting timer.
    #[must_use]
    pub fn running(task: &TaskRef, time: &str) -> Self {
        Self::build(task, time, NotificationAction::Running)
    }

    /// Content for a paused timer.
    #[must_use]
    pub fn paused(task: &TaskRef, time: &str) -> Self {
        Self::build(task, time, NotificationAction::Paused)
    }

    fn build(task: &TaskRef, time: &str, action: NotificationAction) -> Self {
        let name = validate_task_name(&task.task_name).unwrap_or_else(|| UNTITLED_TASK.to_string());
        let body = match action {
            NotificationAction::Running => RUNNING_BODY,
            NotificationAction::Paused => PAUSED_BODY,
        };

        Self {
            title: format!("{} - {}", name, time),
            body: body.to_string(),
            payload: NotificationPayload::new(
                task.task_id.clone(),
                task.project_id.clone(),
                action,
            ),
        }
    }

    /// Returns the action this content was built for.
    #[must_use]
    pub fn action(&self) -> NotificationAction {
        self.payload.action
    }
}

/// Validates a task name for use in notifications.
///
/// Returns the sanitized task name or None if invalid.
pub fn validate_task_name(task_name: &str) -> Option<String> {
    let sanitized: String = task_name
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_TASK_NAME_LENGTH)
        .collect();

    if sanitized.trim().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskRef {
        TaskRef::new("API design", "task-1", Some("proj-1".to_string()))
    }

    #[test]
    fn test_running_content() {
        let content = NotificationContent::running(&task(), "00:00:00");
        assert_eq!(content.title, "API design - 00:00:00");
        assert!(content.body.contains("Tap"));
        assert_eq!(content.action(), NotificationAction::Running);
        assert_eq!(content.payload.task_id, "task-1");
        assert_eq!(content.payload.project_id.as_deref(), Some("proj-1"));
    }

    #[test]
    fn test_paused_content() {
        let content = NotificationContent::paused(&task(), "00:12:03");
        assert_eq!(content.title, "API design - 00:12:03");
        assert!(content.body.contains("paused"));
        assert_eq!(content.action(), NotificationAction::Paused);
    }

    #[test]
    fn test_untitled_fallback() {
        let task = TaskRef::new("\n\t", "task-2", None);
        let content = NotificationContent::running(&task, "00:00:01");
        assert_eq!(content.title, "Untitled task - 00:00:01");
    }

    #[test]
    fn test_validate_task_name_truncates_long() {
        let long_name = "a".repeat(150);
        let result = validate_task_name(&long_name).unwrap();
        assert_eq!(result.len(), MAX_TASK_NAME_LENGTH);
    }

    #[test]
    fn test_validate_task_name_removes_control_chars() {
        let result = validate_task_name("test\n\r\ttask");
        assert_eq!(result, Some("testtask".to_string()));
    }

    #[test]
    fn test_validate_task_name_empty() {
        assert!(validate_task_name("").is_none());
        assert!(validate_task_name("\n\r\t").is_none());
    }
}
