//! Responses returned to the page.
//!
//! Bodies are fully buffered as [`Bytes`], so duplicating a response for the
//! store is a reference-count bump rather than a second read of the stream.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use moonlight_core::{Error, StoredResponse};

/// Where a response handed to the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    /// Navigation fallback page served while offline.
    Fallback,
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl Response {
    /// Whether the response may be stored (status exactly 200).
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Snapshot for the store, stamped with the current time.
    pub fn to_stored(&self) -> StoredResponse {
        StoredResponse {
            url: self.url.to_string(),
            status: self.status.as_u16(),
            status_text: self.status.canonical_reason().unwrap_or_default().to_string(),
            headers: self
                .headers
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect(),
            body: self.body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Rebuild a response from a stored snapshot.
    pub fn from_stored(stored: StoredResponse, source: ResponseSource) -> Result<Self, Error> {
        let url = Url::parse(&stored.url).map_err(|e| Error::CorruptEntry(format!("{}: {e}", stored.url)))?;
        let status =
            StatusCode::from_u16(stored.status).map_err(|e| Error::CorruptEntry(format!("{}: {e}", stored.status)))?;

        let mut headers = HeaderMap::with_capacity(stored.headers.len());
        for (name, value) in &stored.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            headers.append(name, value);
        }

        Ok(Self { url, status, headers, body: Bytes::from(stored.body), source })
    }
}
