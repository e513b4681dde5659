//! cache_keys tool implementation.
//!
//! Lists the request URLs held by one store, or by every store the program
//! uses, oldest first.

use pwakit_worker::Worker;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::store;
use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Store name; omit to list every store.
    #[serde(default)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreKeys {
    pub name: String,
    pub entries: usize,
    /// Request URLs in insertion order.
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    pub stores: Vec<StoreKeys>,
}

pub async fn keys_impl(worker: &Worker, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let selected = match params.store.as_deref() {
        Some(name) => vec![store(worker, name)?],
        None => worker.dispatcher().stores().values().collect(),
    };

    let mut stores = Vec::with_capacity(selected.len());
    for store in selected {
        let urls = store.urls().await?;
        stores.push(StoreKeys { name: store.name().to_string(), entries: urls.len(), urls });
    }

    json_result(&CacheKeysOutput { stores })
}
