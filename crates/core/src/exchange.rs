//! Request and response values passed between the dispatcher, the
//! strategies, the network and the stores.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use url::Url;

use crate::Error;

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new() }
    }

    /// A GET request for an absolute URL.
    pub fn get(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidInput(format!("{url}: {e}")))?;
        Ok(Self::new(Method::GET, url))
    }

    /// Path component used for route matching (no query, no origin).
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Only GET requests over http(s) are ever intercepted.
    pub fn is_interceptable(&self) -> bool {
        self.method == Method::GET && matches!(self.url.scheme(), "http" | "https")
    }
}

/// A response, either live from the network, read from a store, or
/// synthesized by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Final URL the response was fetched from, when known.
    pub url: Option<String>,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into(), url: None }
    }

    /// Synthesized failure for a network error with nothing cached.
    pub fn network_error() -> Self {
        Self::synthesized(StatusCode::REQUEST_TIMEOUT, "Network error")
    }

    /// Synthesized miss for cache-only lookups.
    pub fn not_in_cache() -> Self {
        Self::synthesized(StatusCode::NOT_FOUND, "Not found in cache")
    }

    /// Synthesized failure when a store read fails.
    pub fn store_error() -> Self {
        Self::synthesized(StatusCode::INTERNAL_SERVER_ERROR, "Cache storage error")
    }

    fn synthesized(status: StatusCode, text: &'static str) -> Self {
        let mut response = Self::new(status, Bytes::from_static(text.as_bytes()));
        response
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        response
    }

    /// 2xx and 3xx responses are worth persisting.
    pub fn is_ok(&self) -> bool {
        self.status.is_success() || self.status.is_redirection()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}
