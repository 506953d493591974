//! The worker instance and its shared handles.

use std::sync::Arc;

use tokio::sync::RwLock;
use url::Url;

use moonlight_client::{Network, Scope, resolve};
use moonlight_core::{AssetClass, CacheStorage, Error, RequestKey, WorkerConfig};

use crate::host::ClientHost;
use crate::lifecycle::LifecycleState;

/// An offline cache worker bound to one configuration version.
///
/// Cloning is cheap and shares state; background tasks hold clones.
#[derive(Clone)]
pub struct ServiceWorker {
    pub(crate) config: Arc<WorkerConfig>,
    pub(crate) origin: Url,
    pub(crate) scope: Arc<Scope>,
    pub(crate) storage: Arc<dyn CacheStorage>,
    pub(crate) network: Arc<dyn Network>,
    pub(crate) host: Arc<dyn ClientHost>,
    pub(crate) state: Arc<RwLock<LifecycleState>>,
}

impl ServiceWorker {
    /// Create a worker in the `Parsed` state.
    pub fn new(
        config: WorkerConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, host: Arc<dyn ClientHost>,
    ) -> Result<Self, Error> {
        let origin = Url::parse(&config.scope_origin).map_err(|e| Error::InvalidUrl(format!("scope_origin: {e}")))?;
        let scope = Scope::new(&origin, &config.trusted_hosts);

        Ok(Self {
            config: Arc::new(config),
            origin,
            scope: Arc::new(scope),
            storage,
            network,
            host,
            state: Arc::new(RwLock::new(LifecycleState::Parsed)),
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    pub(crate) async fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.write().await;
        tracing::info!(from = ?*state, to = ?next, "lifecycle transition");
        *state = next;
    }

    /// Resolve a configured site path against the worker's origin.
    pub fn resolve(&self, path: &str) -> Result<Url, Error> {
        resolve(&self.origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
    }

    /// Store that owns responses of the given class.
    pub fn store_for(&self, class: AssetClass) -> String {
        match class {
            AssetClass::Static => self.config.static_cache_name(),
            AssetClass::Dynamic => self.config.dynamic_cache_name(),
        }
    }

    /// Keys held by a store, in enumeration order.
    pub async fn keys(&self, store: &str) -> Result<Vec<RequestKey>, Error> {
        self.storage.keys(store).await
    }

    /// Names of every store currently present.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.storage.list_store_names().await
    }
}
