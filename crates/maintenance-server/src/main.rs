//! Maintenance server - failure prediction and maintenance recommendations
//!
//! Serves the trained failure model over HTTP together with the cost-based
//! decision engine, the component status store, health probes and metrics.

use anyhow::Result;
use maintenance_server::{api, build_state, ServerConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting maintenance-server");

    let config = ServerConfig::load()?;
    info!(
        service_name = %config.service_name,
        port = config.port,
        model_path = %config.model_path.display(),
        "Server configured"
    );

    let state = build_state(&config).await?;
    let logger = state.service.logger().clone();
    logger.log_startup(SERVICE_VERSION, state.service.registry().model_version().as_deref());

    state.health_registry.set_ready(true).await;

    api::serve(config.port, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    Ok(())
}
