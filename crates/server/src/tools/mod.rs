//! MCP tool implementations.
//!
//! Each worker event is exposed as one tool. Tool output is JSON and always
//! carries the host effects (notifications, opened windows, client claims)
//! the event produced.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod lifecycle;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use moonlight_worker::EventOutcome;

use crate::error::HostError;

/// Encode tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| HostError::EncodeFailed(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Error for an outcome that does not belong to the dispatched event.
pub(crate) fn unexpected(outcome: EventOutcome) -> McpError {
    HostError::EncodeFailed(format!("unexpected event outcome: {outcome:?}")).into()
}
