//! pwa-proxy host entry point.
//!
//! Boots one worker version, runs its install and activate phases, then serves
//! the MCP host on stdio transport. Logging goes to stderr to avoid interfering
//! with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pwa_client::{FetchClient, FetchConfig, Network, Worker, WorkerConfig, WorkerEvent};
use pwa_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        version = %config.cache_version,
        db = %config.db_path.display(),
        "starting pwa-proxy on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let worker = Arc::new(Worker::new(WorkerConfig::from_app_config(&config)?, db, network.clone()));

    // A failed phase leaves the worker inactive; every request then passes through.
    for event in [WorkerEvent::Install, WorkerEvent::Activate] {
        if let Err(e) = worker.dispatch(event).await {
            tracing::error!("worker did not start: {e}");
            break;
        }
    }
    tracing::info!(state = %worker.state().await, "worker ready");

    let handler = handler::ProxyHost::new(worker, network);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
