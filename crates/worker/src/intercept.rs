//! Fetch interception.
//!
//! Cache first, network second. A hit is served as stored; a dynamic hit
//! also schedules one background refresh so the next request sees fresher
//! content. A miss goes to the network and status-200 responses are copied
//! into the store that owns their class. When the network is unreachable,
//! navigations fall back to the stored offline page.

use moonlight_client::{Request, Response, ResponseSource};
use moonlight_core::{AssetClass, CacheMatch, Error, RequestKey};

use crate::lifetime::ExtendLifetime;
use crate::worker::ServiceWorker;

/// What the worker does with an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not handled: the request proceeds as if no worker were installed.
    Passthrough,
    /// Answered by the worker.
    Respond(Response),
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond(response) => Some(response),
        }
    }
}

impl ServiceWorker {
    /// Handle an intercepted request.
    ///
    /// Side effects that outlive the response (store writes, refreshes) are
    /// registered on `lifetime`.
    pub async fn handle_fetch(&self, request: &Request, lifetime: &mut ExtendLifetime) -> Result<FetchOutcome, Error> {
        let state = self.state().await;
        if !state.controls_clients() {
            tracing::debug!(url = %request.url, ?state, "not controlling clients, passing through");
            return Ok(FetchOutcome::Passthrough);
        }

        if let Err(reason) = self.scope.check(&request.method, &request.url) {
            tracing::debug!(url = %request.url, "passing through: {reason}");
            return Ok(FetchOutcome::Passthrough);
        }

        let key = request.key();
        let class = self.config.classifier.classify(&request.url);

        if let Some(hit) = self.lookup(&key).await {
            match Response::from_stored(hit.response, ResponseSource::Cache) {
                Ok(response) => {
                    tracing::debug!(key = %key, store = %hit.store_name, "cache hit");
                    if class == AssetClass::Dynamic {
                        self.schedule_refresh(request.clone(), hit.store_name, lifetime);
                    }
                    return Ok(FetchOutcome::Respond(response));
                }
                Err(e) => tracing::warn!(key = %key, "ignoring unreadable entry: {e}"),
            }
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.schedule_put(key, self.store_for(class), &response, lifetime);
                } else {
                    tracing::debug!(url = %request.url, status = response.status.as_u16(), "not caching");
                }
                Ok(FetchOutcome::Respond(response))
            }
            Err(e) => {
                tracing::info!(url = %request.url, "fetch failed: {e}");
                self.offline_fallback(request, &key).await.map(FetchOutcome::Respond).ok_or(e)
            }
        }
    }

    /// Lookup across every store. Read errors count as a miss.
    pub(crate) async fn lookup(&self, key: &RequestKey) -> Option<CacheMatch> {
        match self.storage.match_any(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %key, "cache lookup failed: {e}");
                None
            }
        }
    }

    async fn offline_fallback(&self, request: &Request, key: &RequestKey) -> Option<Response> {
        if request.is_navigation() {
            match self.resolve(&self.config.navigation_fallback) {
                Ok(url) => {
                    if let Some(hit) = self.lookup(&RequestKey::get(url.as_str())).await {
                        tracing::info!(url = %request.url, fallback = %url, "serving offline page");
                        return Response::from_stored(hit.response, ResponseSource::Fallback).ok();
                    }
                }
                Err(e) => tracing::warn!("navigation fallback unusable: {e}"),
            }
        }

        let hit = self.lookup(key).await?;
        Response::from_stored(hit.response, ResponseSource::Cache).ok()
    }

    fn schedule_put(&self, key: RequestKey, store: String, response: &Response, lifetime: &mut ExtendLifetime) {
        let storage = self.storage.clone();
        let stored = response.to_stored();
        lifetime.wait_until(async move {
            match storage.put(&store, &key, &stored).await {
                Ok(()) => tracing::debug!(key = %key, store = %store, "cached"),
                Err(e) => tracing::warn!(key = %key, store = %store, "cache write failed: {e}"),
            }
        });
    }

    /// Re-fetch a served entry and overwrite it on status 200.
    ///
    /// The write targets the store that answered, so the next lookup sees it.
    fn schedule_refresh(&self, request: Request, store: String, lifetime: &mut ExtendLifetime) {
        let worker = self.clone();
        lifetime.wait_until(async move {
            let key = request.key();
            match worker.network.fetch(&request).await {
                Ok(response) if response.is_cacheable() => {
                    if let Err(e) = worker.storage.put(&store, &key, &response.to_stored()).await {
                        tracing::warn!(key = %key, store = %store, "refresh write failed: {e}");
                    } else {
                        tracing::debug!(key = %key, store = %store, "refreshed");
                    }
                }
                Ok(response) => {
                    tracing::debug!(key = %key, status = response.status.as_u16(), "refresh skipped");
                }
                Err(e) => tracing::debug!(key = %key, "background update failed: {e}"),
            }
        });
    }
}
