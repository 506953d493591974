//! sw_fetch tool implementation.
//!
//! Delivers an intercepted request to the worker and reports how it was
//! answered. Cache writes and refreshes triggered by the request keep
//! running after the reply.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use moonlight_client::{Method, Request, RequestMode, ResponseSource};
use moonlight_worker::{Dispatched, EventOutcome, FetchOutcome, HostEffect, RecordingHost, ServiceWorker, WorkerEvent};

use crate::error::HostError;
use crate::tools::{json_result, unexpected};

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the site origin.
    pub url: String,

    /// HTTP method (default: GET). Anything else passes through.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode (default: no-cors). Use "navigate" for page loads.
    #[serde(default)]
    pub mode: RequestMode,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FetchedResponse {
    pub url: String,
    pub status: u16,
    pub source: ResponseSource,
    pub content_type: Option<String>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    pub body_bytes: usize,
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwFetchOutput {
    /// "respond" when the worker answered, "passthrough" otherwise.
    pub outcome: String,
    pub response: Option<FetchedResponse>,
    pub effects: Vec<HostEffect>,
}

pub async fn fetch_impl(
    worker: &ServiceWorker, host: &RecordingHost, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(HostError::InvalidInput("url cannot be empty".into()).into());
    }

    let method = Method::from_bytes(params.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| HostError::InvalidInput(format!("invalid method: {}", params.method)))?;
    let url = worker.resolve(&params.url)?;
    let request = Request { method, url, mode: params.mode };

    let Dispatched { outcome, lifetime } = worker.dispatch(WorkerEvent::Fetch(request)).await?;
    tokio::spawn(async move {
        let completed = lifetime.settle().await;
        tracing::debug!(completed, "fetch side effects settled");
    });

    let outcome = match outcome {
        EventOutcome::Fetched(outcome) => outcome,
        other => return Err(unexpected(other)),
    };

    let output = match outcome {
        FetchOutcome::Passthrough => SwFetchOutput { outcome: "passthrough".into(), response: None, effects: host.drain() },
        FetchOutcome::Respond(response) => SwFetchOutput {
            outcome: "respond".into(),
            response: Some(FetchedResponse {
                url: response.url.to_string(),
                status: response.status.as_u16(),
                source: response.source,
                content_type: response.content_type().map(str::to_string),
                body: String::from_utf8_lossy(&response.body).into_owned(),
                body_bytes: response.body.len(),
            }),
            effects: host.drain(),
        },
    };

    json_result(&output)
}
