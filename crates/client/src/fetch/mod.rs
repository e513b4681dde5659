//! HTTP transport for the worker.
//!
//! ### Behavior
//! - Forwards the intercepted request's method, URL and headers as-is
//! - Any HTTP status is a response; only transport failures are errors
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable); larger bodies count as a failed fetch

pub mod url;

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

pub use url::{UrlError, canonicalize, resolve};

use pwakit_core::{Error, Network, Request, Response};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "pwakit/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Transport timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "pwakit/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// reqwest-backed [`Network`].
pub struct HttpNetwork {
    http: Client,
    config: FetchConfig,
}

impl HttpNetwork {
    /// Create a new transport with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::NetworkTimeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::Network(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport_error)?;

        if body.len() > self.config.max_bytes {
            return Err(Error::Network(format!("{} bytes exceeds {}", body.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "network fetch"
        );

        Ok(Response { status, headers, body, url: Some(final_url) })
    }
}
