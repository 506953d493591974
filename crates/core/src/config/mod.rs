//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MOONLIGHT_*)
//! 2. TOML config file (if MOONLIGHT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::policy::{ClassifierConfig, EvictionConfig};

mod validation;

pub use validation::ConfigError;

/// Worker configuration with layered loading.
///
/// Cache names are derived from `app_name` and the three version strings.
/// Bumping a version produces a new store name; the next activation deletes
/// every store that is not current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Prefix for every store name.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Version suffix of the generic store.
    #[serde(default = "default_version")]
    pub generic_version: String,

    /// Version suffix of the static store.
    #[serde(default = "default_version")]
    pub static_version: String,

    /// Version suffix of the dynamic store.
    #[serde(default = "default_version")]
    pub dynamic_version: String,

    /// Origin the worker is registered for (scheme + host, optional port).
    ///
    /// Relative paths are resolved against it and requests to it are
    /// considered same-origin.
    #[serde(default = "default_scope_origin")]
    pub scope_origin: String,

    /// Paths seeded into the static store during install, in order.
    #[serde(default = "default_static_manifest")]
    pub static_manifest: Vec<String>,

    /// Third-party hosts whose requests are intercepted.
    #[serde(default = "default_trusted_hosts")]
    pub trusted_hosts: Vec<String>,

    /// Dynamic asset classification rule.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Quota-driven eviction of dynamic images.
    #[serde(default)]
    pub eviction: EvictionConfig,

    /// Page served to navigation requests when the network is unreachable.
    #[serde(default = "default_navigation_fallback")]
    pub navigation_fallback: String,

    /// Page opened by a default notification click.
    #[serde(default = "default_home_page")]
    pub home_page: String,

    /// Menu page opened by the "explore" action and refreshed by periodic sync.
    #[serde(default = "default_menu_page")]
    pub menu_page: String,

    /// JSON endpoint returning `{ "lastModified": <number> }`.
    #[serde(default = "default_menu_updates_endpoint")]
    pub menu_updates_endpoint: String,

    /// Periodic sync tag that triggers the menu refresh.
    #[serde(default = "default_menu_sync_tag")]
    pub menu_sync_tag: String,

    /// One-off sync tag acknowledged by the worker.
    #[serde(default = "default_background_sync_tag")]
    pub background_sync_tag: String,

    /// Push notification presentation.
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Path to SQLite cache database.
    ///
    /// Set via MOONLIGHT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout of the network layer in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Presentation defaults for push notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_notification_title")]
    pub title: String,
    #[serde(default = "default_notification_body")]
    pub body: String,
    #[serde(default = "default_notification_icon")]
    pub icon: String,
    #[serde(default = "default_notification_badge")]
    pub badge: String,
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            body: default_notification_body(),
            icon: default_notification_icon(),
            badge: default_notification_badge(),
            vibrate: default_vibrate(),
        }
    }
}

fn default_app_name() -> String {
    "moonlight".into()
}

fn default_version() -> String {
    "v1.2".into()
}

fn default_scope_origin() -> String {
    "https://vericavje8-rgb.github.io".into()
}

fn default_static_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/menu2.html",
        "/assets/css/critical.css",
        "/assets/css/non-critical.css",
        "/assets/css/menu-optimized.css",
        "/assets/js/config.js",
        "/assets/js/performance.js",
        "/assets/images/hero-restaurant.jpg",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_trusted_hosts() -> Vec<String> {
    vec!["fonts.googleapis.com".into(), "cdnjs.cloudflare.com".into()]
}

fn default_navigation_fallback() -> String {
    "/index.html".into()
}

fn default_home_page() -> String {
    "/".into()
}

fn default_menu_page() -> String {
    "/menu2.html".into()
}

fn default_menu_updates_endpoint() -> String {
    "/api/menu-updates".into()
}

fn default_menu_sync_tag() -> String {
    "menu-sync".into()
}

fn default_background_sync_tag() -> String {
    "background-sync".into()
}

fn default_notification_title() -> String {
    "MoonLight Restaurant".into()
}

fn default_notification_body() -> String {
    "New update from MoonLight Restaurant".into()
}

fn default_notification_icon() -> String {
    "/assets/images/icon-192.png".into()
}

fn default_notification_badge() -> String {
    "/assets/images/badge-72.png".into()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./moonlight-cache.sqlite")
}

fn default_user_agent() -> String {
    "moonlight-worker/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            generic_version: default_version(),
            static_version: default_version(),
            dynamic_version: default_version(),
            scope_origin: default_scope_origin(),
            static_manifest: default_static_manifest(),
            trusted_hosts: default_trusted_hosts(),
            classifier: ClassifierConfig::default(),
            eviction: EvictionConfig::default(),
            navigation_fallback: default_navigation_fallback(),
            home_page: default_home_page(),
            menu_page: default_menu_page(),
            menu_updates_endpoint: default_menu_updates_endpoint(),
            menu_sync_tag: default_menu_sync_tag(),
            background_sync_tag: default_background_sync_tag(),
            notification: NotificationConfig::default(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl WorkerConfig {
    /// Name of the generic store, e.g. `moonlight-v1.2`.
    pub fn generic_cache_name(&self) -> String {
        format!("{}-{}", self.app_name, self.generic_version)
    }

    /// Name of the static store, e.g. `moonlight-static-v1.2`.
    pub fn static_cache_name(&self) -> String {
        format!("{}-static-{}", self.app_name, self.static_version)
    }

    /// Name of the dynamic store, e.g. `moonlight-dynamic-v1.2`.
    pub fn dynamic_cache_name(&self) -> String {
        format!("{}-dynamic-{}", self.app_name, self.dynamic_version)
    }

    /// Store names kept by activation.
    pub fn retained_cache_names(&self) -> [String; 2] {
        [self.static_cache_name(), self.dynamic_cache_name()]
    }

    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MOONLIGHT_`
    /// 2. TOML file from `MOONLIGHT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// Nested keys use a double underscore, e.g. `MOONLIGHT_EVICTION__THRESHOLD`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MOONLIGHT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MOONLIGHT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
