//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use moonlight_worker::{
    ActivationReport, EventOutcome, HostEffect, InstallReport, LifecycleState, RecordingHost, ServiceWorker,
    WorkerEvent,
};

use crate::tools::{json_result, unexpected};

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct InstallOutput {
    pub report: InstallReport,
    pub state: LifecycleState,
    pub effects: Vec<HostEffect>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ActivateOutput {
    pub report: ActivationReport,
    pub state: LifecycleState,
    pub effects: Vec<HostEffect>,
}

/// Seed the static store. Fails with `INSTALL_FAILED` and writes nothing if any asset is unavailable.
pub async fn install_impl(worker: &ServiceWorker, host: &RecordingHost) -> Result<CallToolResult, McpError> {
    let report = match worker.dispatch_settled(WorkerEvent::Install).await? {
        EventOutcome::Installed(report) => report,
        other => return Err(unexpected(other)),
    };

    let output = InstallOutput { report, state: worker.state().await, effects: host.drain() };
    json_result(&output)
}

/// Delete stale stores and claim clients.
pub async fn activate_impl(worker: &ServiceWorker, host: &RecordingHost) -> Result<CallToolResult, McpError> {
    let report = match worker.dispatch_settled(WorkerEvent::Activate).await? {
        EventOutcome::Activated(report) => report,
        other => return Err(unexpected(other)),
    };

    let output = ActivateOutput { report, state: worker.state().await, effects: host.drain() };
    json_result(&output)
}
