//! sw_fetch tool implementation.
//!
//! Sends one request through the worker's fetch hook. Requests the worker
//! does not intercept go straight to the network, as a browser would.

use std::collections::BTreeMap;

use http::{HeaderName, HeaderValue, Method};
use pwakit_core::{Network, Request};
use pwakit_worker::Worker;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use super::json_result;
use crate::error::HostError;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are intercepted.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub content_type: Option<String>,
    /// Body as text; absent when the body is not UTF-8.
    pub body: Option<String>,
    pub body_bytes: usize,
    /// One of network, cache, synthesized or passthrough.
    pub source: String,
    /// Index of the route that handled the request.
    pub route: Option<usize>,
    pub strategy: Option<String>,
}

fn build_request(origin: &Url, params: &SwFetchParams) -> Result<Request, HostError> {
    let url = Url::parse(&params.url)
        .or_else(|_| origin.join(&params.url))
        .map_err(|e| HostError::InvalidRequest(format!("url {}: {e}", params.url)))?;
    let method = Method::from_bytes(params.method.to_uppercase().as_bytes())
        .map_err(|e| HostError::InvalidRequest(format!("method {}: {e}", params.method)))?;

    let mut request = Request::new(method, url);
    for (name, value) in &params.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HostError::InvalidRequest(format!("header {name}: {e}")))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| HostError::InvalidRequest(format!("header {name}: {e}")))?;
        request.headers.append(name, value);
    }
    Ok(request)
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(
    worker: &Worker, network: &dyn Network, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    let request = build_request(worker.program().origin(), &params)?;

    let (response, source, route, strategy) = match worker.fetch(&request).await {
        Some(handled) => (
            handled.response,
            handled.source.as_str().to_string(),
            Some(handled.route),
            Some(handled.strategy.to_string()),
        ),
        None => (network.fetch(&request).await?, "passthrough".to_string(), None, None),
    };

    let headers = response
        .headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
        .collect();

    let output = SwFetchOutput {
        url: request.url.to_string(),
        status: response.status.as_u16(),
        content_type: response.content_type().map(str::to_string),
        headers,
        body: std::str::from_utf8(&response.body).ok().map(str::to_string),
        body_bytes: response.body.len(),
        source,
        route,
        strategy,
    };
    json_result(&output)
}
