//! MCP server handler implementation.
//!
//! Exposes the hooks of one activated worker as tools.
use std::sync::Arc;

use pwakit_core::Network;
use pwakit_worker::{RecordingHost, Worker};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::tools::{
    CacheKeysParams, CachePurgeParams, SwFetchParams, SwNotificationClickParams, SwPushParams, click_impl,
    fetch_impl, keys_impl, purge_impl, push_impl,
};

/// The MCP server handler for pwakit.
#[derive(Clone)]
pub struct PwakitServer {
    worker: Arc<Worker>,
    network: Arc<dyn Network>,
    host: Arc<RecordingHost>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl PwakitServer {
    pub fn new(worker: Arc<Worker>, network: Arc<dyn Network>, host: Arc<RecordingHost>) -> Self {
        Self { worker, network, host, tool_router: Self::tool_router() }
    }

    /// Send a request through the worker's fetch hook.
    #[tool(
        description = "Send a request through the caching worker. Returns status, headers, body and whether it came from the network, a cache store, a synthesized fallback, or passed through."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, self.network.as_ref(), params.0).await
    }

    #[tool(description = "Deliver a push event. The payload is decoded as JSON, falling back to plain text.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(
        description = "Click a shown notification by id or tag. Focuses a window already at the target URL or opens a new one."
    )]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        click_impl(&self.worker, &self.host, params.0).await
    }

    #[tool(description = "List the URLs held by a cache store, oldest first. Omit store to list every store.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(&self.worker, params.0).await
    }

    #[tool(description = "Purge a cache store: one URL, down to the newest max_entries, or everything.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for PwakitServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pwakit".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Routes are matched in declaration order; the first matching rule handles a request.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
