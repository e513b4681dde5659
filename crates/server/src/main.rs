//! pwakit-server entry point.
//!
//! Loads configuration, installs and activates one worker for the configured
//! origin, and serves its hooks as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use pwakit_client::{FetchConfig, HttpNetwork};
use pwakit_core::config::AppConfig;
use pwakit_core::{CacheDb, Network, Program};
use pwakit_worker::{RecordingHost, Worker};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let program = Program::build(&config).context("compiling routes")?;
    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;

    let network: Arc<dyn Network> = Arc::new(HttpNetwork::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        timeout: config.timeout(),
        ..Default::default()
    })?);
    let host = Arc::new(RecordingHost::new());

    let worker = Worker::builder(program, db.clone(), network.clone())
        .notification_host(host.clone(), host.clone())
        .build();

    let precached = worker.install().await.context("installing worker")?;
    worker.activate().await?;
    tracing::info!(origin = %config.origin, precached, routes = worker.program().routes().len(), "worker activated");

    let worker = Arc::new(worker);
    let handler = handler::PwakitServer::new(worker.clone(), network, host);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;
    worker.drain().await;
    db.close().await.context("closing cache database")?;

    Ok(())
}
