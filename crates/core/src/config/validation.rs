//! Configuration validation rules.
//!
//! This module provides validation logic for `WorkerConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::WorkerConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl WorkerConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `app_name` or any version string is empty
    /// - `scope_origin` is not an absolute http(s) URL with a host
    /// - `static_manifest` is empty or holds an entry not starting with `/`
    /// - `eviction.batch` is 0 or exceeds `eviction.threshold`
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.is_empty() {
            return Err(invalid("app_name", "must not be empty"));
        }
        for (field, version) in [
            ("generic_version", &self.generic_version),
            ("static_version", &self.static_version),
            ("dynamic_version", &self.dynamic_version),
        ] {
            if version.is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        let origin = url::Url::parse(&self.scope_origin).map_err(|e| invalid("scope_origin", e.to_string()))?;
        if !matches!(origin.scheme(), "http" | "https") || origin.host_str().is_none() {
            return Err(invalid("scope_origin", "must be an http(s) origin with a host"));
        }

        if self.static_manifest.is_empty() {
            return Err(invalid("static_manifest", "must list at least one path"));
        }
        if let Some(bad) = self.static_manifest.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("static_manifest", format!("path must start with '/': {bad}")));
        }

        if self.eviction.batch == 0 {
            return Err(invalid("eviction.batch", "must be greater than 0"));
        }
        if self.eviction.batch > self.eviction.threshold {
            return Err(invalid("eviction.batch", "must not exceed eviction.threshold"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.generic_version != self.static_version || self.generic_version != self.dynamic_version {
            tracing::debug!(
                generic_version = %self.generic_version,
                static_version = %self.static_version,
                dynamic_version = %self.dynamic_version,
                "store versions differ"
            );
        }

        Ok(())
    }
}
