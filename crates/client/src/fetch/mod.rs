//! Network layer beneath the cache worker.
//!
//! ### URL Resolution
//! - Site-relative paths resolve against the worker's origin
//! - Lowercase host, remove fragments, preserve query string
//!
//! ### Scope
//! - Only GET requests to the worker's origin or a trusted host are handled
//!
//! ### Status handling
//! - Every HTTP status is a response, including 4xx/5xx
//! - Only the absence of a response (DNS, TLS, connect, timeout) is an error

pub mod scope;
pub mod url;

use reqwest::Client;
use std::time::{Duration, Instant};

pub use scope::{Scope, ScopeError};
pub use self::url::{UrlError, resolve};

use crate::{Request, Response, ResponseSource};
use moonlight_core::{Error, WorkerConfig};

/// Source of network responses.
///
/// The worker only depends on this trait, so tests and alternative hosts
/// can supply their own transport.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. `Err` means no response could be obtained.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// User agent string (default: "moonlight-worker/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { user_agent: "moonlight-worker/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&WorkerConfig> for HttpConfig {
    fn from(config: &WorkerConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// reqwest-backed network.
pub struct HttpNetwork {
    http: Client,
}

impl HttpNetwork {
    /// Create a new network client with the given configuration.
    pub fn new(config: &HttpConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.as_str())
            .send()
            .await
            .map_err(|e| Error::Network(format!("{}: {}", request.url, e)))?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        tracing::debug!(
            "fetched {} -> {} {} in {}ms ({} bytes)",
            request.url,
            final_url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response { url: final_url, status, headers, body, source: ResponseSource::Network })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.user_agent, "moonlight-worker/0.1");
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_http_config_from_worker_config() {
        let worker = WorkerConfig { user_agent: "moonlight-test".into(), timeout_ms: 1500, ..Default::default() };
        let config = HttpConfig::from(&worker);
        assert_eq!(config.user_agent, "moonlight-test");
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_http_network_new() {
        let network = HttpNetwork::new(&HttpConfig::default());
        assert!(network.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let network = HttpNetwork::new(&HttpConfig { timeout: Duration::from_millis(500), ..Default::default() }).unwrap();
        let request = Request::get(::url::Url::parse("http://127.0.0.1:9/index.html").unwrap());
        let result = network.fetch(&request).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
