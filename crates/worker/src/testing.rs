//! Test doubles and fixtures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use moonlight_client::{Network, Request, Response, ResponseSource, StatusCode};
use moonlight_core::{CacheDb, Error, StoredResponse, WorkerConfig};

use crate::host::RecordingHost;
use crate::lifecycle::LifecycleState;
use crate::worker::ServiceWorker;

#[derive(Debug, Clone)]
enum Route {
    Respond { status: u16, body: Bytes },
    Fail,
    /// Never answers.
    Stall,
}

/// Scripted network. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StubNetwork {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
}

impl StubNetwork {
    pub fn respond(&self, url: &str, status: u16, body: &str) {
        let route = Route::Respond { status, body: Bytes::copy_from_slice(body.as_bytes()) };
        self.routes.lock().unwrap().insert(url.to_string(), route);
    }

    /// Make requests to `url` fail without a response.
    pub fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Fail);
    }

    /// Make requests to `url` hang forever.
    pub fn stall(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Stall);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Requests made to `url` so far, including failed ones.
    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        *self.calls.lock().unwrap().entry(url.clone()).or_default() += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{url}: offline")));
        }

        let route = self.routes.lock().unwrap().get(&url).cloned();
        let (status, body) = match route {
            Some(Route::Respond { status, body }) => (status, body),
            Some(Route::Fail) => return Err(Error::Network(format!("{url}: connection refused"))),
            Some(Route::Stall) => std::future::pending().await,
            None => (404, Bytes::from_static(b"not found")),
        };

        Ok(Response {
            url: request.url.clone(),
            status: StatusCode::from_u16(status).unwrap(),
            headers: Default::default(),
            body,
            source: ResponseSource::Network,
        })
    }
}

/// Configuration for an origin that never resolves outside tests.
pub fn test_config() -> WorkerConfig {
    WorkerConfig {
        scope_origin: "https://moonlight.test".into(),
        static_manifest: vec!["/index.html".into(), "/menu2.html".into()],
        ..Default::default()
    }
}

/// A status-200 snapshot for `url`.
pub fn stored(url: &str, body: &str) -> StoredResponse {
    StoredResponse {
        url: url.to_string(),
        status: 200,
        status_text: "OK".into(),
        headers: vec![],
        body: body.as_bytes().to_vec(),
        stored_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// A worker wired to an in-memory store, a stub network and a recording host.
pub struct TestHarness {
    pub worker: ServiceWorker,
    pub db: Arc<CacheDb>,
    pub network: Arc<StubNetwork>,
    pub host: Arc<RecordingHost>,
}

impl TestHarness {
    pub async fn new(config: WorkerConfig) -> Self {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let network = Arc::new(StubNetwork::default());
        let host = Arc::new(RecordingHost::new());
        let worker = ServiceWorker::new(config, db.clone(), network.clone(), host.clone()).unwrap();
        Self { worker, db, network, host }
    }

    /// Installed with the manifest served as `<h1>Home</h1>` and `<h1>Menu</h1>`.
    pub async fn installed(config: WorkerConfig) -> Self {
        let harness = Self::new(config).await;
        harness.network.respond("https://moonlight.test/index.html", 200, "<h1>Home</h1>");
        harness.network.respond("https://moonlight.test/menu2.html", 200, "<h1>Menu</h1>");
        harness.worker.install().await.unwrap();
        harness.host.drain();
        harness
    }

    pub async fn activated(config: WorkerConfig) -> Self {
        let harness = Self::installed(config).await;
        harness.worker.activate().await.unwrap();
        harness.host.drain();
        harness
    }

    /// Mark the worker activated without installing anything.
    pub async fn force_activated(&self) {
        self.worker.set_state(LifecycleState::Activated).await;
    }

    /// A fresh worker for `config` sharing this harness's store and network.
    pub fn with_config(&self, config: WorkerConfig) -> Self {
        let host = Arc::new(RecordingHost::new());
        let worker = ServiceWorker::new(config, self.db.clone(), self.network.clone(), host.clone()).unwrap();
        Self { worker, db: self.db.clone(), network: self.network.clone(), host }
    }
}
