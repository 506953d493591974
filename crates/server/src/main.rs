//! moonlight-worker-host entry point.
//!
//! Boots the offline cache worker and exposes its events as MCP tools on
//! stdio. Logging goes to stderr to avoid interfering with the JSON-RPC
//! protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

use moonlight_client::{HttpConfig, HttpNetwork};
use moonlight_core::{CacheDb, WorkerConfig};
use moonlight_worker::{RecordingHost, ServiceWorker};

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = WorkerConfig::load()?;
    tracing::info!(
        origin = %config.scope_origin,
        static_store = %config.static_cache_name(),
        dynamic_store = %config.dynamic_cache_name(),
        "Starting moonlight-worker-host on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network = HttpNetwork::new(&HttpConfig::from(&config))?;
    let host = Arc::new(RecordingHost::new());
    let worker = ServiceWorker::new(config, Arc::new(db), Arc::new(network), host.clone())?;

    let handler = handler::WorkerHost::new(worker, host);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
