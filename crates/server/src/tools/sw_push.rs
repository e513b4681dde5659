//! sw_push tool implementation.

use pwakit_worker::{ShownNotification, Worker};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for the sw_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Raw push payload, usually a JSON object. Omit for a push without payload.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwPushOutput {
    /// The notification displayed, if any.
    pub shown: Option<ShownNotification>,
}

pub async fn push_impl(worker: &Worker, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let shown = worker.push(params.payload.as_deref().map(str::as_bytes)).await?;
    json_result(&SwPushOutput { shown })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{output, worker};

    #[tokio::test]
    async fn test_push_structured_payload() {
        let (worker, _network, host) = worker().await;
        let params = SwPushParams { payload: Some(r#"{"title":"Build done","tag":"ci"}"#.into()) };

        let out: SwPushOutput = output(&push_impl(&worker, params).await.unwrap());
        let shown = out.shown.unwrap();
        assert_eq!(shown.notification.title, "Build done");
        assert_eq!(host.find_by_tag("ci").unwrap().id, shown.id);
    }

    #[tokio::test]
    async fn test_push_text_payload_falls_back() {
        let (worker, _network, _host) = worker().await;
        let params = SwPushParams { payload: Some("plain words".into()) };

        let out: SwPushOutput = output(&push_impl(&worker, params).await.unwrap());
        let shown = out.shown.unwrap();
        assert_eq!(shown.notification.title, "Notification");
        assert_eq!(shown.notification.options.body, "plain words");
    }

    #[tokio::test]
    async fn test_push_without_payload() {
        let (worker, _network, host) = worker().await;

        let out: SwPushOutput = output(&push_impl(&worker, SwPushParams { payload: None }).await.unwrap());
        assert!(out.shown.is_none());
        assert!(host.notifications().is_empty());
    }
}
