//! Offline asset cache worker for the MoonLight restaurant site.
//!
//! The worker seeds a static store at install time, prunes stale store
//! versions at activation, and then answers intercepted requests from its
//! stores before the network. Push, notification, sync, quota and message
//! events are handled on the side.
//!
//! Hosts drive it by constructing a [`ServiceWorker`] and delivering
//! [`WorkerEvent`]s through [`ServiceWorker::dispatch`], settling the
//! returned [`Dispatched`] once they have replied.

pub mod event;
pub mod eviction;
pub mod host;
pub mod intercept;
pub mod lifecycle;
pub mod lifetime;
pub mod push;
pub mod sync;
pub mod worker;

#[cfg(test)]
mod testing;

pub use event::{Dispatched, EventKind, EventOutcome, WorkerEvent};
pub use host::{ClientHost, HostEffect, Notification, NotificationAction, NotificationData, RecordingHost};
pub use intercept::FetchOutcome;
pub use lifecycle::{ActivationReport, InstallReport, LifecycleState};
pub use lifetime::ExtendLifetime;
pub use push::PushPayload;
pub use sync::MenuSync;
pub use worker::ServiceWorker;
