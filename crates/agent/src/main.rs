//! Standalone host for the SHOficina → remote order sync agent.
//!
//! Reads configuration (`oslink.{toml,json}` plus `OSLINK_*` variables),
//! takes the remote session from `OSLINK_SERVER_URL` / `OSLINK_TOKEN`, runs
//! until Ctrl-C and then stops the agent cleanly.

mod logging;

use std::sync::Arc;

use anyhow::Context;
use oslink_core::SyncService;
use oslink_infra::api::{GatewayConfig, HttpOrderGateway};
use oslink_infra::legacy::PowerShellReader;
use oslink_infra::queue::JsonFileQueue;
use oslink_infra::sync::{StartOutcome, SyncAgent, SyncAgentConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal; real deployments set the environment.
    let _ = dotenvy::dotenv();
    logging::init();

    let config = oslink_infra::config::load().context("loading configuration")?;
    info!(
        legacy_db = %config.legacy.db_path.display(),
        queue = %config.sync.queue_path.display(),
        poll_interval_ms = config.sync.poll_interval_ms,
        "Configuration loaded"
    );

    let reader = Arc::new(PowerShellReader::new(&config.legacy));
    let gateway = Arc::new(
        HttpOrderGateway::new(GatewayConfig {
            timeout: config.sync.request_timeout(),
            ..GatewayConfig::default()
        })
        .context("building HTTP gateway")?,
    );
    let queue = Arc::new(JsonFileQueue::open(&config.sync.queue_path));

    let service = SyncService::new(reader, gateway, queue);
    let mut agent = SyncAgent::new(service, SyncAgentConfig::from(&config.sync));

    let server_url = std::env::var("OSLINK_SERVER_URL").unwrap_or_default();
    let token = std::env::var("OSLINK_TOKEN").unwrap_or_default();
    if server_url.trim().is_empty() || token.trim().is_empty() {
        warn!("OSLINK_SERVER_URL or OSLINK_TOKEN not set; orders will be queued locally");
    }

    match agent.start(&server_url, &token).await {
        StartOutcome::Disabled => {
            info!("Nothing to sync on this host; exiting");
            return Ok(());
        }
        StartOutcome::Started | StartOutcome::CredentialsUpdated => {}
    }

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("Shutdown requested");

    let status = agent.status().await;
    if let Err(err) = agent.stop().await {
        // The runtime shuts down next and aborts whatever is left of the cycle.
        warn!(error = %err, "Sync agent did not stop cleanly");
    }
    info!(pending = status.pending, "Sync agent shut down");
    Ok(())
}
