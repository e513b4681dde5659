//! Shared fixtures for tool tests.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use pwakit_core::config::AppConfig;
use pwakit_core::{CacheDb, Error, Network, Program, Request, Response, Rule, StrategyKind};
use pwakit_worker::{RecordingHost, Worker};
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;

pub(crate) const ORIGIN: &str = "https://app.test";

/// Answers every path under `/down` with a transport failure and
/// everything else with `body of <path>`.
pub(crate) struct StaticNetwork;

#[async_trait]
impl Network for StaticNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        if request.path().starts_with("/down") {
            return Err(Error::Network(format!("unreachable: {}", request.url)));
        }
        Ok(Response::new(StatusCode::OK, format!("body of {}", request.path())))
    }
}

/// An installed, activated worker with images, live API and page routes.
pub(crate) async fn worker() -> (Arc<Worker>, Arc<dyn Network>, Arc<RecordingHost>) {
    let mut config = AppConfig { origin: ORIGIN.to_string(), ..Default::default() };
    config.sw.routes = vec![
        Rule::new("*.png", StrategyKind::CacheFirst).with_cache("images").with_max_entries(2),
        Rule::new("/api/**", StrategyKind::NetworkOnly),
        Rule::new("/**", StrategyKind::CacheFirst).with_cache("pages"),
    ];
    let program = Program::compile(&config, vec!["/".to_string()]).unwrap();

    let network: Arc<dyn Network> = Arc::new(StaticNetwork);
    let host = Arc::new(RecordingHost::new());
    let worker = Worker::builder(program, CacheDb::open_in_memory().await.unwrap(), network.clone())
        .notification_host(host.clone(), host.clone())
        .build();
    worker.install().await.unwrap();
    worker.activate().await.unwrap();

    (Arc::new(worker), network, host)
}

pub(crate) fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
