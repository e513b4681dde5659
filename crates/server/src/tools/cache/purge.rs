//! cache_purge tool implementation.
//!
//! Purges one URL from a store, trims a store to a FIFO bound, or clears it.

use pwakit_core::Error;
use pwakit_worker::Worker;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::store;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Store to purge.
    pub store: String,

    /// Delete only this URL (absolute, or a path resolved against the origin).
    #[serde(default)]
    pub url: Option<String>,

    /// Keep only the newest N entries (FIFO purge).
    #[serde(default)]
    pub max_entries: Option<usize>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
///
/// With neither `url` nor `max_entries`, the whole store is cleared.
pub async fn purge_impl(worker: &Worker, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let store = store(worker, &params.store)?;

    let deleted = match (params.url.as_deref(), params.max_entries) {
        (Some(_), Some(_)) => {
            return Err(Error::InvalidInput("At most one of url or max_entries may be specified".to_string()).into());
        }
        (Some(raw), None) => {
            let url = pwakit_client::resolve(worker.program().origin(), raw)
                .map_err(|e| Error::InvalidInput(format!("{raw}: {e}")))?;
            u64::from(store.delete(&url).await?)
        }
        (None, Some(max_entries)) => store.trim(max_entries).await?,
        (None, None) => store.clear().await?,
    };

    tracing::info!(store = store.name(), deleted, "store purged");
    json_result(&CachePurgeOutput { deleted })
}
