//! Interception scope.
//!
//! Decides which outbound requests the worker may handle: reads (GET) to
//! its own origin or to an explicitly trusted third-party host. Anything
//! else passes through untouched.

use reqwest::Method;
use url::{Origin, Url};

/// Reason a request is left to the network untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("method {0} is not intercepted")]
    Method(String),

    #[error("origin {0} is not trusted")]
    Origin(String),
}

/// The worker's origin plus its trusted third-party hosts.
#[derive(Debug, Clone)]
pub struct Scope {
    origin: Origin,
    trusted_hosts: Vec<String>,
}

impl Scope {
    /// Create a scope for `origin`, trusting the given hosts.
    pub fn new(origin: &Url, trusted_hosts: &[String]) -> Self {
        Self {
            origin: origin.origin(),
            trusted_hosts: trusted_hosts.iter().map(|h| h.to_ascii_lowercase()).collect(),
        }
    }

    /// Whether `url` has the worker's own origin.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin
    }

    /// Whether `url` targets a trusted third-party host.
    pub fn is_trusted(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| self.trusted_hosts.iter().any(|h| h == host))
    }

    /// Check that a request should be intercepted.
    pub fn check(&self, method: &Method, url: &Url) -> Result<(), ScopeError> {
        if *method != Method::GET {
            return Err(ScopeError::Method(method.to_string()));
        }
        if !self.is_same_origin(url) && !self.is_trusted(url) {
            return Err(ScopeError::Origin(url.origin().ascii_serialization()));
        }
        Ok(())
    }
}
