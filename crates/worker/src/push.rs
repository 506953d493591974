//! Push notifications and notification clicks.

use serde::Deserialize;
use serde_json::Value;

use moonlight_core::Error;

use crate::host::{Notification, NotificationAction, NotificationData};
use crate::worker::ServiceWorker;

/// Action id that opens the menu page.
pub const ACTION_EXPLORE: &str = "explore";
/// Action id that only dismisses the notification.
pub const ACTION_CLOSE: &str = "close";

/// Body of a push message. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub primary_key: Value,
}

impl PushPayload {
    /// Decode a push message. `None` when there is no payload.
    pub fn parse(data: Option<&[u8]>) -> Result<Option<Self>, Error> {
        let Some(bytes) = data else {
            return Ok(None);
        };
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| Error::InvalidPayload(format!("push: {e}")))
    }
}

/// Empty strings, zero, `false` and `null` fall back to the default key.
fn primary_key_or_default(key: Value) -> Value {
    let blank = match &key {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if blank { Value::from(1) } else { key }
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

impl ServiceWorker {
    /// Build the notification shown for a push payload.
    pub fn build_notification(&self, payload: PushPayload) -> Notification {
        let defaults = &self.config.notification;
        Notification {
            title: non_empty(payload.title, &defaults.title),
            body: non_empty(payload.body, &defaults.body),
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
            vibrate: defaults.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: chrono::Utc::now().timestamp_millis(),
                primary_key: primary_key_or_default(payload.primary_key),
            },
            actions: vec![
                NotificationAction {
                    action: ACTION_EXPLORE.into(),
                    title: "View Menu".into(),
                    icon: "/assets/images/checkmark.png".into(),
                },
                NotificationAction {
                    action: ACTION_CLOSE.into(),
                    title: "Close".into(),
                    icon: "/assets/images/xmark.png".into(),
                },
            ],
        }
    }

    /// Show a notification for a push message.
    ///
    /// A missing or undecodable payload shows nothing and is not an error.
    pub async fn on_push(&self, data: Option<&[u8]>) -> Option<Notification> {
        let payload = match PushPayload::parse(data) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::debug!("push without payload ignored");
                return None;
            }
            Err(e) => {
                tracing::debug!("{e}");
                return None;
            }
        };

        let notification = self.build_notification(payload);
        if let Err(e) = self.host.show_notification(&notification).await {
            tracing::warn!("showing notification failed: {e}");
            return None;
        }
        Some(notification)
    }

    /// React to a click on a notification or one of its actions.
    ///
    /// Returns the page opened, if any.
    pub async fn on_notification_click(&self, action: Option<&str>, primary_key: Option<&Value>) -> Option<String> {
        if let Err(e) = self.host.close_notification(primary_key).await {
            tracing::warn!("closing notification failed: {e}");
        }

        let page = match action.unwrap_or_default() {
            ACTION_CLOSE => return None,
            ACTION_EXPLORE => &self.config.menu_page,
            _ => &self.config.home_page,
        };

        let url = match self.resolve(page) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("cannot open {page}: {e}");
                return None;
            }
        };

        match self.host.open_window(&url).await {
            Ok(()) => Some(url.to_string()),
            Err(e) => {
                tracing::warn!(url = %url, "opening window failed: {e}");
                None
            }
        }
    }
}
