//! MCP server handler implementation.
//!
//! Routes tool calls to the worker as events.
use std::sync::Arc;

use crate::tools::cache::{CacheKeysParams, keys_impl};
use crate::tools::events::{
    SwMessageParams, SwNotificationClickParams, SwPushParams, SwSyncParams, message_impl, notification_click_impl,
    periodic_sync_impl, push_impl, quota_exceeded_impl, sync_impl,
};
use crate::tools::fetch::{SwFetchParams, fetch_impl};
use crate::tools::lifecycle::{activate_impl, install_impl};

use moonlight_worker::{RecordingHost, ServiceWorker};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// MCP handler hosting one worker.
///
/// Host effects are recorded rather than performed and returned with each
/// tool result.
#[derive(Clone)]
pub struct WorkerHost {
    worker: ServiceWorker,
    host: Arc<RecordingHost>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WorkerHost {
    pub fn new(worker: ServiceWorker, host: Arc<RecordingHost>) -> Self {
        Self { worker, host, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Deliver the install event: seed the static store from the asset manifest. All or nothing; fails with INSTALL_FAILED if any asset is unavailable."
    )]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker, &self.host).await
    }

    #[tool(description = "Deliver the activate event: delete stale store versions and claim open pages.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker, &self.host).await
    }

    /// Intercept a request as a controlled page would issue it.
    #[tool(
        description = "Deliver a fetch event. Returns the response served (cache, network or offline fallback) or passthrough when the worker does not handle the request."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Deliver a push message. A JSON payload {title?, body?, primaryKey?} shows a notification.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Deliver a notification click. action \"explore\" opens the menu, \"close\" only dismisses.")]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        notification_click_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Deliver a one-off background sync event for a tag.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Deliver a periodic sync event. The menu-sync tag refreshes the cached menu when it changed.")]
    async fn sw_periodic_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        periodic_sync_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "Deliver a storage quota exceeded event: evict the oldest cached images.")]
    async fn sw_quota_exceeded(&self) -> Result<CallToolResult, McpError> {
        quota_exceeded_impl(&self.worker, &self.host).await
    }

    #[tool(description = "Deliver a message posted by a page, e.g. PERFORMANCE_METRICS.")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "List the request keys held by one store, or by every store when none is given.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for WorkerHost {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "moonlight-worker-host".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline asset cache worker for the MoonLight restaurant site. Call sw_install then sw_activate before sw_fetch."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::offline_worker;

    #[tokio::test]
    async fn test_every_event_has_a_tool() {
        let (worker, _, host) = offline_worker().await;
        let handler = WorkerHost::new(worker, host);

        let mut names: Vec<String> = handler.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "cache_keys",
                "sw_activate",
                "sw_fetch",
                "sw_install",
                "sw_message",
                "sw_notification_click",
                "sw_periodic_sync",
                "sw_push",
                "sw_quota_exceeded",
                "sw_sync",
            ]
        );
    }
}
