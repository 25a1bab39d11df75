//! Push message pass-through.
//!
//! A push carries an optional JSON payload `{title?, options?}`. The only
//! obligation is to turn it into a notification, filling in defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const DEFAULT_TITLE: &str = "New Notification";
const DEFAULT_ICON: &str = "/icons/icon-96x96.png";

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub options: Value,
}

#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    options: Option<Value>,
}

fn default_options() -> Value {
    json!({
        "body": "You have a new message!",
        "icon": DEFAULT_ICON,
        "badge": DEFAULT_ICON,
    })
}

impl Notification {
    /// Build the notification for a push delivery.
    ///
    /// A missing or unparseable payload yields the default notification.
    pub fn from_push(data: Option<&[u8]>) -> Self {
        let payload = match data {
            Some(bytes) => serde_json::from_slice::<PushPayload>(bytes).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed push payload: {e}");
                PushPayload::default()
            }),
            None => PushPayload::default(),
        };

        Self {
            title: payload
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            options: payload
                .options
                .filter(|o| !o.is_null())
                .unwrap_or_else(default_options),
        }
    }
}
