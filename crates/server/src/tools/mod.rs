//! MCP tool implementations.
//!
//! Each tool drives one worker hook (or one store operation) and returns its
//! result as pretty-printed JSON text.

pub mod cache;
pub mod sw_fetch;
pub mod sw_notification_click;
pub mod sw_push;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::HostError;

pub use cache::{CacheKeysParams, CachePurgeParams, keys_impl, purge_impl};
pub use sw_fetch::{SwFetchParams, fetch_impl};
pub use sw_notification_click::{SwNotificationClickParams, click_impl};
pub use sw_push::{SwPushParams, push_impl};

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| HostError::Output(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
