//! sw_notification_click tool implementation.
//!
//! Clicks a notification previously shown through sw_push, selected by id or
//! by tag (most recent wins).

use pwakit_worker::{RecordingHost, Worker};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::HostError;

/// Input parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// Id returned by sw_push.
    #[serde(default)]
    pub id: Option<u64>,

    /// Tag of the notification, used when no id is given.
    #[serde(default)]
    pub tag: Option<String>,
}

pub async fn click_impl(
    worker: &Worker, host: &RecordingHost, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let shown = match (params.id, params.tag.as_deref()) {
        (Some(id), _) => host.find(id).ok_or_else(|| HostError::NotificationNotFound(format!("id {id}")))?,
        (None, Some(tag)) => {
            host.find_by_tag(tag).ok_or_else(|| HostError::NotificationNotFound(format!("tag {tag}")))?
        }
        (None, None) => return Err(HostError::InvalidRequest("one of id or tag must be specified".into()).into()),
    };

    let outcome = worker.notification_click(&shown).await?;
    json_result(&outcome)
}
