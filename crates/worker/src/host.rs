//! Capabilities the hosting environment lends to the worker.

use std::sync::Mutex;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use moonlight_core::Error;

/// A button rendered on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Data attached to a notification and handed back on click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: serde_json::Value,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// Host-side effects requested by the worker.
#[async_trait::async_trait]
pub trait ClientHost: Send + Sync {
    /// Activate without waiting for the previous worker's clients to close.
    async fn skip_waiting(&self) -> Result<(), Error>;

    /// Take control of every open page.
    async fn claim_clients(&self) -> Result<(), Error>;

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, primary_key: Option<&serde_json::Value>) -> Result<(), Error>;

    /// Open a page, or focus it if already open.
    async fn open_window(&self, url: &Url) -> Result<(), Error>;
}

/// A host effect, as recorded by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum HostEffect {
    SkipWaiting,
    ClaimClients,
    ShowNotification { notification: Notification },
    CloseNotification { primary_key: Option<serde_json::Value> },
    OpenWindow { url: String },
}

/// Host that records effects instead of performing them.
///
/// Used where no page is attached: the effects are reported to whoever
/// delivered the event.
#[derive(Debug, Default)]
pub struct RecordingHost {
    effects: Mutex<Vec<HostEffect>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, effect: HostEffect) -> Result<(), Error> {
        tracing::debug!(?effect, "host effect");
        self.effects
            .lock()
            .map_err(|e| Error::InvalidState(format!("host effect log poisoned: {e}")))?
            .push(effect);
        Ok(())
    }

    /// Remove and return every recorded effect.
    pub fn drain(&self) -> Vec<HostEffect> {
        self.effects
            .lock()
            .map(|mut effects| std::mem::take(&mut *effects))
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ClientHost for RecordingHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.record(HostEffect::SkipWaiting)
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        self.record(HostEffect::ClaimClients)
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.record(HostEffect::ShowNotification { notification: notification.clone() })
    }

    async fn close_notification(&self, primary_key: Option<&serde_json::Value>) -> Result<(), Error> {
        self.record(HostEffect::CloseNotification { primary_key: primary_key.cloned() })
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.record(HostEffect::OpenWindow { url: url.to_string() })
    }
}
