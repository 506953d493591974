//! Install and activate phases.
//!
//! ```text
//! Parsed -> Installing -> Installed -> Activating -> Activated
//!               |
//!               +-> Redundant (seeding failed, nothing written)
//! ```
//!
//! Re-installing an `Activated` worker reseeds the static store while it
//! keeps serving; a failed reseed leaves it `Activated`.
//!
//! `Activated` holds until a new version is deployed. There is no rollback:
//! stores deleted during activation stay deleted even if a later deletion
//! fails.

use schemars::JsonSchema;
use serde::Serialize;

use moonlight_client::Request;
use moonlight_core::{Error, RequestKey, StoredResponse};

use crate::worker::ServiceWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl LifecycleState {
    /// Whether the worker controls pages and intercepts their requests.
    pub fn controls_clients(self) -> bool {
        self == LifecycleState::Activated
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct InstallReport {
    pub store: String,
    pub seeded: Vec<String>,
}

/// Result of an activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ActivationReport {
    /// Stale stores removed.
    pub deleted: Vec<String>,
    /// Stale stores whose removal failed; retried on the next activation.
    pub failed: Vec<String>,
}

impl ServiceWorker {
    /// Seed the static store with every manifest entry.
    ///
    /// Each entry is fetched before anything is written; the batch is then
    /// stored in one transaction. A single failed fetch or non-2xx response
    /// fails the whole install and leaves the stores untouched.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let serving = self.state().await.controls_clients();
        if !serving {
            self.set_state(LifecycleState::Installing).await;
        }

        match self.seed_static_store().await {
            Ok(report) => {
                if !serving {
                    self.set_state(LifecycleState::Installed).await;
                }
                if let Err(e) = self.host.skip_waiting().await {
                    tracing::warn!("skip waiting failed: {e}");
                }
                Ok(report)
            }
            Err(e) if serving => {
                tracing::warn!("install failed, current version keeps serving: {e}");
                Err(e)
            }
            Err(e) => {
                tracing::warn!("install failed: {e}");
                self.set_state(LifecycleState::Redundant).await;
                Err(e)
            }
        }
    }

    async fn seed_static_store(&self) -> Result<InstallReport, Error> {
        let store = self.config.static_cache_name();
        self.storage.open_store(&store).await?;
        tracing::info!(store = %store, assets = self.config.static_manifest.len(), "caching static assets");

        let mut batch: Vec<(RequestKey, StoredResponse)> = Vec::with_capacity(self.config.static_manifest.len());
        for path in &self.config.static_manifest {
            let url = self.resolve(path).map_err(|e| Error::InstallFailed(e.to_string()))?;
            let request = Request::get(url);

            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;

            if !response.status.is_success() {
                return Err(Error::InstallFailed(format!("{path} returned {}", response.status.as_u16())));
            }

            batch.push((request.key(), response.to_stored()));
        }

        self.storage
            .put_all(&store, &batch)
            .await
            .map_err(|e| Error::InstallFailed(e.to_string()))?;

        let seeded = batch.into_iter().map(|(key, _)| key.url).collect();
        Ok(InstallReport { store, seeded })
    }

    /// Delete stale stores, then take control of open pages.
    ///
    /// Every store other than the current static and dynamic one is deleted.
    /// Re-running with an unchanged configuration deletes nothing.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let current = self.state().await;
        if !matches!(current, LifecycleState::Installed | LifecycleState::Activating | LifecycleState::Activated) {
            return Err(Error::InvalidState(format!("cannot activate from {current:?}")));
        }

        self.set_state(LifecycleState::Activating).await;

        let retained = self.config.retained_cache_names();
        let mut report = ActivationReport::default();

        match self.storage.list_store_names().await {
            Ok(names) => {
                for name in names.into_iter().filter(|n| !retained.contains(n)) {
                    tracing::info!(store = %name, "deleting old cache");
                    match self.storage.delete_store(&name).await {
                        Ok(_) => report.deleted.push(name),
                        Err(e) => {
                            tracing::warn!(store = %name, "failed to delete old cache: {e}");
                            report.failed.push(name);
                        }
                    }
                }
            }
            Err(e) => tracing::warn!("failed to list caches: {e}"),
        }

        if let Err(e) = self.host.claim_clients().await {
            tracing::warn!("claiming clients failed: {e}");
        }

        self.set_state(LifecycleState::Activated).await;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostEffect;
    use crate::lifetime::ExtendLifetime;
    use crate::testing::{TestHarness, test_config};
    use moonlight_client::ResponseSource;
    use moonlight_core::{CacheStorage, WorkerConfig};

    #[tokio::test]
    async fn test_install_seeds_manifest_round_trip() {
        let harness = TestHarness::new(test_config()).await;
        harness.network.respond("https://moonlight.test/index.html", 200, "<h1>Home</h1>");
        harness.network.respond("https://moonlight.test/menu2.html", 200, "<h1>Menu</h1>");

        let report = harness.worker.install().await.unwrap();

        assert_eq!(report.store, "moonlight-static-v1.2");
        assert_eq!(report.seeded, vec!["https://moonlight.test/index.html", "https://moonlight.test/menu2.html"]);
        for (url, body) in [("https://moonlight.test/index.html", "<h1>Home</h1>"), ("https://moonlight.test/menu2.html", "<h1>Menu</h1>")] {
            let stored = harness.db.get("moonlight-static-v1.2", &RequestKey::get(url)).await.unwrap().unwrap();
            assert_eq!(stored.status, 200);
            assert_eq!(stored.body, body.as_bytes().to_vec());
        }
        assert_eq!(harness.worker.state().await, LifecycleState::Installed);
        assert_eq!(harness.host.drain(), vec![HostEffect::SkipWaiting]);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing_on_network_failure() {
        let harness = TestHarness::new(test_config()).await;
        harness.network.respond("https://moonlight.test/index.html", 200, "<h1>Home</h1>");
        harness.network.fail("https://moonlight.test/menu2.html");

        let result = harness.worker.install().await;

        assert!(matches!(result, Err(Error::InstallFailed(_))));
        assert!(harness.db.keys("moonlight-static-v1.2").await.unwrap().is_empty());
        assert_eq!(harness.worker.state().await, LifecycleState::Redundant);
        assert!(harness.host.drain().is_empty());
    }

    #[tokio::test]
    async fn test_install_fails_on_error_status() {
        let harness = TestHarness::new(test_config()).await;
        harness.network.respond("https://moonlight.test/index.html", 200, "<h1>Home</h1>");
        harness.network.respond("https://moonlight.test/menu2.html", 404, "missing");

        let result = harness.worker.install().await;

        assert!(matches!(result, Err(Error::InstallFailed(msg)) if msg.contains("404")));
        assert!(harness.db.get("moonlight-static-v1.2", &RequestKey::get("https://moonlight.test/index.html")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_install_keeps_previous_version_serving() {
        let harness = TestHarness::activated(test_config()).await;
        harness.network.set_offline(true);

        assert!(matches!(harness.worker.install().await, Err(Error::InstallFailed(_))));
        assert_eq!(harness.worker.state().await, LifecycleState::Activated);

        let request = Request::get(harness.worker.resolve("/index.html").unwrap());
        let mut lifetime = ExtendLifetime::new();
        let outcome = harness.worker.handle_fetch(&request, &mut lifetime).await.unwrap();
        lifetime.settle().await;

        let response = outcome.response().expect("activated worker answers from its store");
        assert_eq!(response.source, ResponseSource::Cache);
        assert_eq!(response.body.as_ref(), b"<h1>Home</h1>");
    }

    #[tokio::test]
    async fn test_reinstall_while_activated_keeps_serving() {
        let harness = TestHarness::activated(test_config()).await;
        harness.network.respond("https://moonlight.test/index.html", 200, "<h1>Home again</h1>");

        harness.worker.install().await.unwrap();

        assert_eq!(harness.worker.state().await, LifecycleState::Activated);
        let home = RequestKey::get("https://moonlight.test/index.html");
        let stored = harness.db.get("moonlight-static-v1.2", &home).await.unwrap().unwrap();
        assert_eq!(stored.body, b"<h1>Home again</h1>".to_vec());
    }

    #[tokio::test]
    async fn test_failed_install_leaves_older_stores_intact() {
        let harness = TestHarness::new(test_config()).await;
        let old = RequestKey::get("https://moonlight.test/index.html");
        let stored = crate::testing::stored(&old.url, "old home");
        harness.db.put("moonlight-static-v1.1", &old, &stored).await.unwrap();
        harness.network.fail("https://moonlight.test/index.html");

        assert!(harness.worker.install().await.is_err());
        assert_eq!(harness.db.list_store_names().await.unwrap(), vec!["moonlight-static-v1.1", "moonlight-static-v1.2"]);
        assert!(harness.db.get("moonlight-static-v1.1", &old).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_versions() {
        let harness = TestHarness::installed(test_config()).await;
        for name in ["moonlight-static-v1.1", "moonlight-dynamic-v1.1", "moonlight-v1.2"] {
            harness.db.open_store(name).await.unwrap();
        }
        harness.db.open_store("moonlight-dynamic-v1.2").await.unwrap();

        let report = harness.worker.activate().await.unwrap();

        assert_eq!(report.deleted, vec!["moonlight-static-v1.1", "moonlight-dynamic-v1.1", "moonlight-v1.2"]);
        assert!(report.failed.is_empty());
        assert_eq!(harness.db.list_store_names().await.unwrap(), vec!["moonlight-static-v1.2", "moonlight-dynamic-v1.2"]);
        assert_eq!(harness.worker.state().await, LifecycleState::Activated);
        assert_eq!(harness.host.drain(), vec![HostEffect::ClaimClients]);
    }

    #[tokio::test]
    async fn test_activate_twice_is_noop() {
        let harness = TestHarness::activated(test_config()).await;
        let before = harness.db.list_store_names().await.unwrap();

        let report = harness.worker.activate().await.unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(harness.db.list_store_names().await.unwrap(), before);
        assert_eq!(harness.host.drain(), vec![HostEffect::ClaimClients]);
    }

    #[tokio::test]
    async fn test_activate_after_version_bump_keeps_one_store_per_category() {
        let harness = TestHarness::activated(test_config()).await;
        let bumped = WorkerConfig { static_version: "v1.3".into(), dynamic_version: "v1.3".into(), ..test_config() };
        let next = harness.with_config(bumped);
        next.network.respond("https://moonlight.test/index.html", 200, "<h1>Home v1.3</h1>");
        next.network.respond("https://moonlight.test/menu2.html", 200, "<h1>Menu v1.3</h1>");
        next.db.open_store("moonlight-dynamic-v1.2").await.unwrap();

        next.worker.install().await.unwrap();
        next.worker.activate().await.unwrap();

        assert_eq!(next.db.list_store_names().await.unwrap(), vec!["moonlight-static-v1.3"]);
    }

    #[tokio::test]
    async fn test_activate_before_install_rejected() {
        let harness = TestHarness::new(test_config()).await;
        let result = harness.worker.activate().await;
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(harness.worker.state().await, LifecycleState::Parsed);
    }
}
