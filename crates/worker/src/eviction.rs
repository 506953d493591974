//! Quota-driven eviction of cached images.
//!
//! Only image entries in the dynamic store are candidates; the static store
//! is never touched.

use url::Url;

use crate::worker::ServiceWorker;

impl ServiceWorker {
    /// Trim cached images from the dynamic store after a quota error.
    ///
    /// Returns how many entries were deleted. Failures are logged and the
    /// remaining victims are still attempted; nothing is retried.
    pub async fn on_quota_exceeded(&self) -> usize {
        let store = self.config.dynamic_cache_name();
        tracing::info!(store = %store, "cache quota exceeded, cleaning up");

        if let Err(e) = self.storage.open_store(&store).await {
            tracing::warn!(store = %store, "cannot open store for eviction: {e}");
            return 0;
        }

        let keys = match self.storage.keys(&store).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(store = %store, "cannot list entries for eviction: {e}");
                return 0;
            }
        };

        let images: Vec<_> = keys
            .into_iter()
            .filter(|key| Url::parse(&key.url).is_ok_and(|url| self.config.classifier.is_image(&url)))
            .collect();

        let victims = self.config.eviction.select_victims(&images);
        if victims.is_empty() {
            tracing::debug!(store = %store, images = images.len(), "below eviction threshold");
            return 0;
        }

        let mut deleted = 0;
        for key in victims {
            match self.storage.delete(&store, key).await {
                Ok(true) => deleted += 1,
                Ok(false) => tracing::debug!(key = %key, "already evicted"),
                Err(e) => tracing::warn!(key = %key, "eviction failed: {e}"),
            }
        }

        tracing::info!(store = %store, deleted, remaining = images.len() - deleted, "evicted cached images");
        deleted
    }
}
