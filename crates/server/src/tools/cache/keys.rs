//! cache_keys tool implementation.
//!
//! Lists the request keys held by one store, or by every store.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use moonlight_core::{Error, RequestKey};
use moonlight_worker::ServiceWorker;

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Store to list. Every store when omitted.
    #[serde(default)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct StoreListing {
    pub name: String,
    /// Keys in enumeration order.
    pub keys: Vec<RequestKey>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheKeysOutput {
    pub stores: Vec<StoreListing>,
}

pub async fn keys_impl(worker: &ServiceWorker, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let names = worker.store_names().await?;

    let selected = match params.store {
        Some(store) if names.contains(&store) => vec![store],
        Some(store) => return Err(Error::CacheMiss(format!("store {store}")).into()),
        None => names,
    };

    let mut stores = Vec::with_capacity(selected.len());
    for name in selected {
        let keys = worker.keys(&name).await?;
        stores.push(StoreListing { name, keys });
    }

    json_result(&CacheKeysOutput { stores })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::offline_worker;
    use moonlight_core::{CacheStorage, StoredResponse};

    #[tokio::test]
    async fn test_keys_unknown_store() {
        let (worker, _, _) = offline_worker().await;
        let params = CacheKeysParams { store: Some("moonlight-static-v0.9".into()) };

        let result = keys_impl(&worker, params).await;
        assert!(matches!(result, Err(e) if e.code.0 == -32001));
    }

    #[tokio::test]
    async fn test_keys_lists_every_store() {
        let (worker, db, _) = offline_worker().await;
        let key = RequestKey::get("http://127.0.0.1:9/index.html");
        let response = StoredResponse {
            url: key.url.clone(),
            status: 200,
            status_text: "OK".into(),
            headers: vec![],
            body: b"home".to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        };
        db.put("moonlight-static-v1.2", &key, &response).await.unwrap();
        db.open_store("moonlight-dynamic-v1.2").await.unwrap();

        let result = keys_impl(&worker, CacheKeysParams { store: None }).await.unwrap();
        let text = serde_json::to_string(&result.content).unwrap();

        assert!(text.contains("moonlight-static-v1.2"));
        assert!(text.contains("moonlight-dynamic-v1.2"));
        assert!(text.contains("index.html"));
    }
}
