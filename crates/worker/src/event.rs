//! Event dispatch.
//!
//! [`ServiceWorker::dispatch`] returns as soon as the handler has an outcome.
//! Side effects registered for lifetime extension travel with it in
//! [`Dispatched`], and the host settles them after it has replied.

use serde_json::Value;
use tracing::Instrument;

use moonlight_client::Request;
use moonlight_core::Error;

use crate::host::Notification;
use crate::intercept::FetchOutcome;
use crate::lifecycle::{ActivationReport, InstallReport};
use crate::lifetime::ExtendLifetime;
use crate::sync::MenuSync;
use crate::worker::ServiceWorker;

/// An event delivered to the worker by its host.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    /// Raw push payload, if the message carried one.
    Push(Option<Vec<u8>>),
    NotificationClick { action: Option<String>, primary_key: Option<Value> },
    Sync { tag: String },
    PeriodicSync { tag: String },
    QuotaExceeded,
    Message(Value),
}

/// Event type, named as the platform names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Push,
    NotificationClick,
    Sync,
    PeriodicSync,
    QuotaExceeded,
    Message,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Push => "push",
            EventKind::NotificationClick => "notificationclick",
            EventKind::Sync => "sync",
            EventKind::PeriodicSync => "periodicsync",
            EventKind::QuotaExceeded => "quotaexceeded",
            EventKind::Message => "message",
        }
    }
}

impl WorkerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorkerEvent::Install => EventKind::Install,
            WorkerEvent::Activate => EventKind::Activate,
            WorkerEvent::Fetch(_) => EventKind::Fetch,
            WorkerEvent::Push(_) => EventKind::Push,
            WorkerEvent::NotificationClick { .. } => EventKind::NotificationClick,
            WorkerEvent::Sync { .. } => EventKind::Sync,
            WorkerEvent::PeriodicSync { .. } => EventKind::PeriodicSync,
            WorkerEvent::QuotaExceeded => EventKind::QuotaExceeded,
            WorkerEvent::Message(_) => EventKind::Message,
        }
    }
}

/// Result of handling one event.
#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivationReport),
    Fetched(FetchOutcome),
    /// Notification shown for a push, if any.
    Notified(Option<Notification>),
    /// Page opened by a notification click, if any.
    Clicked(Option<String>),
    /// Whether the sync tag was recognised.
    Synced(bool),
    MenuSynced(MenuSync),
    Evicted(usize),
    /// Whether the message was understood.
    MessageHandled(bool),
}

/// An event's outcome together with the side effects still running for it.
#[must_use = "dropping a dispatched event aborts its pending side effects"]
pub struct Dispatched {
    pub outcome: EventOutcome,
    pub lifetime: ExtendLifetime,
}

impl Dispatched {
    /// Wait for the pending side effects, then return the outcome.
    pub async fn settle(self) -> EventOutcome {
        let Dispatched { outcome, lifetime } = self;
        let pending = lifetime.pending();
        if pending > 0 {
            let completed = lifetime.settle().await;
            tracing::debug!(pending, completed, "extended lifetime settled");
        }
        outcome
    }
}

impl ServiceWorker {
    /// Deliver an event.
    ///
    /// Returns once the handler has produced its outcome; a cache hit is
    /// never held back by the refresh it scheduled.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<Dispatched, Error> {
        let kind = event.kind();
        let span = tracing::info_span!("event", kind = kind.as_str());

        async move {
            let mut lifetime = ExtendLifetime::new();
            match self.handle(event, &mut lifetime).await {
                Ok(outcome) => Ok(Dispatched { outcome, lifetime }),
                Err(e) => {
                    lifetime.settle().await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Deliver an event and wait for all of its side effects.
    pub async fn dispatch_settled(&self, event: WorkerEvent) -> Result<EventOutcome, Error> {
        Ok(self.dispatch(event).await?.settle().await)
    }

    async fn handle(&self, event: WorkerEvent, lifetime: &mut ExtendLifetime) -> Result<EventOutcome, Error> {
        match event {
            WorkerEvent::Install => self.install().await.map(EventOutcome::Installed),
            WorkerEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            WorkerEvent::Fetch(request) => self.handle_fetch(&request, lifetime).await.map(EventOutcome::Fetched),
            WorkerEvent::Push(data) => Ok(EventOutcome::Notified(self.on_push(data.as_deref()).await)),
            WorkerEvent::NotificationClick { action, primary_key } => Ok(EventOutcome::Clicked(
                self.on_notification_click(action.as_deref(), primary_key.as_ref()).await,
            )),
            WorkerEvent::Sync { tag } => Ok(EventOutcome::Synced(self.on_sync(&tag))),
            WorkerEvent::PeriodicSync { tag } => Ok(EventOutcome::MenuSynced(self.on_periodic_sync(&tag).await)),
            WorkerEvent::QuotaExceeded => Ok(EventOutcome::Evicted(self.on_quota_exceeded().await)),
            WorkerEvent::Message(data) => Ok(EventOutcome::MessageHandled(self.on_message(&data))),
        }
    }
}
