//! Background sync, periodic menu sync and page messages.
//!
//! The last menu modification time seen is kept as a sentinel entry in the
//! dynamic store, so it shares the store's lifetime: a new dynamic version
//! starts from zero and refreshes the menu on its first periodic sync. Its
//! key is a URN, outside every origin, so no page request can reach it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use moonlight_client::Request;
use moonlight_core::{Error, RequestKey, StoredResponse};

use crate::worker::ServiceWorker;

/// Key of the sentinel entry holding the last menu modification time.
const MENU_SENTINEL_URL: &str = "urn:moonlight-sw:menu-last-modified";

/// Message type carrying page performance metrics.
pub const PERFORMANCE_METRICS: &str = "PERFORMANCE_METRICS";

/// Outcome of a periodic sync event.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MenuSync {
    /// The menu page was re-fetched into the store serving it.
    Updated { last_modified: f64 },
    UpToDate { last_modified: f64 },
    /// The sync was abandoned; it is not retried.
    Failed,
    /// Tag not handled by this worker.
    Ignored,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuUpdates {
    last_modified: f64,
}

impl ServiceWorker {
    /// Handle a one-off background sync.
    ///
    /// Nothing is queued offline, so the sync is only acknowledged.
    pub fn on_sync(&self, tag: &str) -> bool {
        if tag == self.config.background_sync_tag {
            tracing::info!(tag, "background sync triggered");
            true
        } else {
            tracing::debug!(tag, "unknown sync tag ignored");
            false
        }
    }

    /// Handle a periodic sync.
    pub async fn on_periodic_sync(&self, tag: &str) -> MenuSync {
        if tag != self.config.menu_sync_tag {
            tracing::debug!(tag, "unknown periodic sync tag ignored");
            return MenuSync::Ignored;
        }

        match self.sync_menu().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!("menu sync failed: {e}");
                MenuSync::Failed
            }
        }
    }

    async fn sync_menu(&self) -> Result<MenuSync, Error> {
        let endpoint = self.resolve(&self.config.menu_updates_endpoint)?;
        let response = self.network.fetch(&Request::get(endpoint)).await?;
        let updates: MenuUpdates = serde_json::from_slice(&response.body)
            .map_err(|e| Error::InvalidPayload(format!("menu updates: {e}")))?;

        let known = self.last_menu_update().await;
        if updates.last_modified <= known {
            tracing::debug!(last_modified = updates.last_modified, known, "menu up to date");
            return Ok(MenuSync::UpToDate { last_modified: known });
        }

        let menu = Request::get(self.resolve(&self.config.menu_page)?);
        let page = self.network.fetch(&menu).await?;
        if !page.status.is_success() {
            return Err(Error::Network(format!("{} returned {}", menu.url, page.status.as_u16())));
        }

        let key = menu.key();
        let store = match self.lookup(&key).await {
            Some(hit) => hit.store_name,
            None => self.config.dynamic_cache_name(),
        };
        self.storage.put(&store, &key, &page.to_stored()).await?;
        self.record_menu_update(updates.last_modified).await?;

        tracing::info!(store = %store, last_modified = updates.last_modified, "menu refreshed");
        Ok(MenuSync::Updated { last_modified: updates.last_modified })
    }

    /// Last menu modification time seen, or zero.
    pub async fn last_menu_update(&self) -> f64 {
        let key = RequestKey::get(MENU_SENTINEL_URL);
        match self.storage.get(&self.config.dynamic_cache_name(), &key).await {
            Ok(Some(entry)) => std::str::from_utf8(&entry.body)
                .ok()
                .and_then(|text| text.trim().parse().ok())
                .unwrap_or(0.0),
            Ok(None) => 0.0,
            Err(e) => {
                tracing::debug!("reading last menu update failed: {e}");
                0.0
            }
        }
    }

    async fn record_menu_update(&self, last_modified: f64) -> Result<(), Error> {
        let key = RequestKey::get(MENU_SENTINEL_URL);
        let entry = StoredResponse {
            url: key.url.clone(),
            status: 200,
            status_text: "OK".into(),
            headers: vec![("content-type".into(), "text/plain".into())],
            body: last_modified.to_string().into_bytes(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        };
        self.storage.put(&self.config.dynamic_cache_name(), &key, &entry).await
    }

    /// Handle a message posted by a page. Returns whether it was understood.
    pub fn on_message(&self, data: &Value) -> bool {
        if data.get("type").and_then(Value::as_str) != Some(PERFORMANCE_METRICS) {
            tracing::debug!("unhandled message ignored");
            return false;
        }

        let metrics = data.get("metrics").cloned().unwrap_or(Value::Null);
        tracing::info!(metrics = %metrics, "performance metrics");
        true
    }
}
