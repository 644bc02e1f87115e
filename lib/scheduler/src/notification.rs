//! Platform notification surface.

use crate::error::NotificationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use waypost_core::NodeId;

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Notifications may be shown.
    Granted,
    /// The user refused notifications.
    Denied,
    /// The user has not been asked yet.
    #[default]
    Default,
}

impl Permission {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            "default" | "prompt" => Ok(Self::Default),
            other => Err(format!("unknown permission '{other}'")),
        }
    }
}

/// A notification ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Tag used by the platform to coalesce notifications; the node id.
    pub tag: String,
    /// Whether the notification stays until the user dismisses it.
    pub require_interaction: bool,
}

/// Fixed parts of every schedule notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_icon")]
    pub icon: String,

    #[serde(default = "default_require_interaction")]
    pub require_interaction: bool,
}

fn default_title() -> String {
    "Workflow Notification".to_string()
}

fn default_icon() -> String {
    "/workflow-icon.png".to_string()
}

fn default_require_interaction() -> bool {
    true
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            title: default_title(),
            icon: default_icon(),
            require_interaction: default_require_interaction(),
        }
    }
}

impl NotificationTemplate {
    /// Builds the notification for `node_id` carrying `body`.
    #[must_use]
    pub fn render(&self, node_id: &NodeId, body: String) -> Notification {
        Notification {
            title: self.title.clone(),
            body,
            icon: self.icon.clone(),
            tag: node_id.to_string(),
            require_interaction: self.require_interaction,
        }
    }
}

/// Where fired schedules are delivered.
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Returns the current permission without asking the user.
    fn permission(&self) -> Permission;

    /// Asks the user for permission and returns the answer.
    async fn request_permission(&self) -> Permission;

    /// Shows a notification.
    async fn notify(&self, notification: &Notification) -> Result<(), NotificationError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_defaults() {
        let template = NotificationTemplate::default();
        let notification = template.render(&NodeId::new("action-9"), "Step 1:".to_string());

        assert_eq!(notification.title, "Workflow Notification");
        assert_eq!(notification.icon, "/workflow-icon.png");
        assert_eq!(notification.tag, "action-9");
        assert!(notification.require_interaction);
        assert_eq!(notification.body, "Step 1:");
    }

    #[test]
    fn template_fills_missing_fields() {
        let template: NotificationTemplate =
            serde_json::from_str(r#"{"title":"Reminder"}"#).unwrap();
        assert_eq!(template.title, "Reminder");
        assert_eq!(template.icon, "/workflow-icon.png");
    }

    #[test]
    fn permission_parses_prompt_alias() {
        assert_eq!("prompt".parse::<Permission>(), Ok(Permission::Default));
        assert_eq!("Granted".parse::<Permission>(), Ok(Permission::Granted));
        assert!("maybe".parse::<Permission>().is_err());
    }
}
