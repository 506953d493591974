//! Intercepted requests.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use moonlight_core::RequestKey;

/// Why the page issued the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Loading a full page.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

/// An outbound request observed by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
}

impl Request {
    /// A sub-resource GET request.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, mode: RequestMode::NoCors }
    }

    /// A page navigation.
    pub fn navigate(url: Url) -> Self {
        Self { method: Method::GET, url, mode: RequestMode::Navigate }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Store key of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey { method: self.method.as_str().to_string(), url: self.url.to_string() }
    }
}
