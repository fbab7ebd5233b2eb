//! Push payloads and notification clicks.

use serde::Serialize;
use serde_json::Value;

use super::{EventOutcome, Worker};

const DEFAULT_TITLE: &str = "Simple App";
const DEFAULT_BODY: &str = "Nouvelle notification";
const DEFAULT_TAG: &str = "simple-app";
const ICON: &str = "./icons/icon-192x192.png";

pub const ACTION_OPEN: &str = "open";
pub const ACTION_DISMISS: &str = "dismiss";

/// Fields read from a push payload; all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tag: Option<String>,
}

impl PushPayload {
    /// Read the text fields of any JSON value.
    ///
    /// Strings are taken as-is and numbers are printed. Any other field type,
    /// or a value that is not an object, leaves the field unset.
    pub fn from_json(value: &Value) -> Self {
        Self { title: text_field(value, "title"), body: text_field(value, "body"), tag: text_field(value, "tag") }
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A notification for the host to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub renotify: bool,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
}

impl From<PushPayload> for Notification {
    fn from(payload: PushPayload) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        Self {
            title: non_empty(payload.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: non_empty(payload.body).unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: ICON.to_string(),
            badge: ICON.to_string(),
            tag: non_empty(payload.tag).unwrap_or_else(|| DEFAULT_TAG.to_string()),
            renotify: true,
            require_interaction: false,
            actions: vec![
                NotificationAction { action: ACTION_OPEN.into(), title: "Ouvrir".into() },
                NotificationAction { action: ACTION_DISMISS.into(), title: "Fermer".into() },
            ],
        }
    }
}

impl Worker {
    /// Build the notification for a push payload.
    ///
    /// Returns `None` for a missing payload or one that is not valid JSON.
    /// Fields that are absent or not text fall back to their defaults.
    pub fn handle_push(&self, payload: Option<&[u8]>) -> Option<Notification> {
        let Some(bytes) = payload else {
            tracing::debug!("push without payload");
            return None;
        };
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Some(PushPayload::from_json(&value).into()),
            Err(e) => {
                tracing::debug!("ignoring malformed push payload: {e}");
                None
            }
        }
    }

    /// The notification is always closed; `open` or a click on the body also
    /// opens the application's root window.
    pub fn handle_notification_click(&self, action: Option<&str>) -> EventOutcome {
        match action {
            None | Some("") | Some(ACTION_OPEN) => EventOutcome::OpenWindow(self.config.root_url()),
            Some(other) => {
                tracing::debug!(action = other, "closing notification");
                EventOutcome::CloseNotification
            }
        }
    }
}
