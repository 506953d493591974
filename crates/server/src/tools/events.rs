//! Side-channel event tools: push, notification click, sync, periodic
//! sync, quota exceeded and page messages.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use moonlight_worker::{EventOutcome, HostEffect, MenuSync, RecordingHost, ServiceWorker, WorkerEvent};

use crate::tools::{json_result, unexpected};

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Push message body, typically JSON `{title?, body?, primaryKey?}`.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// Action button clicked ("explore" or "close"); the notification body when omitted.
    #[serde(default)]
    pub action: Option<String>,

    /// Primary key of the clicked notification.
    #[serde(default)]
    pub primary_key: Option<Value>,
}

/// Parameters for the sw_sync and sw_periodic_sync tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    pub tag: String,
}

/// Parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// Message posted by the page, e.g. `{"type": "PERFORMANCE_METRICS", "metrics": {...}}`.
    pub data: Value,
}

/// Output shared by the side-channel tools.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SideChannelOutput<T> {
    pub result: T,
    pub effects: Vec<HostEffect>,
}

/// Outcome of a push event.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PushResult {
    pub shown: bool,
}

/// Outcome of a notification click.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ClickResult {
    pub opened: Option<String>,
}

/// Outcome of an event that is either understood or ignored.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct HandledResult {
    pub handled: bool,
}

/// Outcome of a quota exceeded event.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct EvictionResult {
    pub evicted: usize,
}

fn output<T: Serialize>(result: T, host: &RecordingHost) -> Result<CallToolResult, McpError> {
    json_result(&SideChannelOutput { result, effects: host.drain() })
}

pub async fn push_impl(
    worker: &ServiceWorker, host: &RecordingHost, params: SwPushParams,
) -> Result<CallToolResult, McpError> {
    let event = WorkerEvent::Push(params.payload.map(String::into_bytes));
    match worker.dispatch_settled(event).await? {
        EventOutcome::Notified(notification) => output(PushResult { shown: notification.is_some() }, host),
        other => Err(unexpected(other)),
    }
}

pub async fn notification_click_impl(
    worker: &ServiceWorker, host: &RecordingHost, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let event = WorkerEvent::NotificationClick { action: params.action, primary_key: params.primary_key };
    match worker.dispatch_settled(event).await? {
        EventOutcome::Clicked(opened) => output(ClickResult { opened }, host),
        other => Err(unexpected(other)),
    }
}

pub async fn sync_impl(
    worker: &ServiceWorker, host: &RecordingHost, params: SwSyncParams,
) -> Result<CallToolResult, McpError> {
    match worker.dispatch_settled(WorkerEvent::Sync { tag: params.tag }).await? {
        EventOutcome::Synced(handled) => output(HandledResult { handled }, host),
        other => Err(unexpected(other)),
    }
}

pub async fn periodic_sync_impl(
    worker: &ServiceWorker, host: &RecordingHost, params: SwSyncParams,
) -> Result<CallToolResult, McpError> {
    match worker.dispatch_settled(WorkerEvent::PeriodicSync { tag: params.tag }).await? {
        EventOutcome::MenuSynced(sync) => output::<MenuSync>(sync, host),
        other => Err(unexpected(other)),
    }
}

pub async fn quota_exceeded_impl(worker: &ServiceWorker, host: &RecordingHost) -> Result<CallToolResult, McpError> {
    match worker.dispatch_settled(WorkerEvent::QuotaExceeded).await? {
        EventOutcome::Evicted(evicted) => output(EvictionResult { evicted }, host),
        other => Err(unexpected(other)),
    }
}

pub async fn message_impl(
    worker: &ServiceWorker, host: &RecordingHost, params: SwMessageParams,
) -> Result<CallToolResult, McpError> {
    match worker.dispatch_settled(WorkerEvent::Message(params.data)).await? {
        EventOutcome::MessageHandled(handled) => output(HandledResult { handled }, host),
        other => Err(unexpected(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::offline_worker;

    fn text(result: &CallToolResult) -> String {
        serde_json::to_string(&result.content).unwrap()
    }

    #[tokio::test]
    async fn test_push_reports_notification_effect() {
        let (worker, _, host) = offline_worker().await;
        let params = SwPushParams { payload: Some(r#"{"title":"Live jazz tonight"}"#.into()) };

        let result = push_impl(&worker, &host, params).await.unwrap();

        let text = text(&result);
        assert!(text.contains("show_notification"));
        assert!(text.contains("Live jazz tonight"));
    }

    #[tokio::test]
    async fn test_malformed_push_shows_nothing() {
        let (worker, _, host) = offline_worker().await;
        let params = SwPushParams { payload: Some("{oops".into()) };

        let result = push_impl(&worker, &host, params).await.unwrap();

        assert!(!text(&result).contains("show_notification"));
    }

    #[tokio::test]
    async fn test_click_explore_opens_menu() {
        let (worker, _, host) = offline_worker().await;
        let params = SwNotificationClickParams { action: Some("explore".into()), primary_key: None };

        let result = notification_click_impl(&worker, &host, params).await.unwrap();

        let text = text(&result);
        assert!(text.contains("close_notification"));
        assert!(text.contains("menu2.html"));
    }

    #[tokio::test]
    async fn test_periodic_sync_offline_fails_quietly() {
        let (worker, _, host) = offline_worker().await;

        let result = periodic_sync_impl(&worker, &host, SwSyncParams { tag: "menu-sync".into() }).await.unwrap();

        assert!(text(&result).contains("failed"));
    }

    #[tokio::test]
    async fn test_quota_exceeded_on_empty_store() {
        let (worker, _, host) = offline_worker().await;
        let result = quota_exceeded_impl(&worker, &host).await.unwrap();
        assert!(text(&result).contains("evicted"));
    }

    #[tokio::test]
    async fn test_message_handled() {
        let (worker, _, host) = offline_worker().await;
        let params = SwMessageParams { data: serde_json::json!({ "type": "PERFORMANCE_METRICS", "metrics": { "fcp": 800 } }) };

        let result = message_impl(&worker, &host, params).await.unwrap();

        assert!(text(&result).contains("true"));
    }
}
