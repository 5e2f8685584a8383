//! `marginalia-node` entry point.

use anyhow::{Context, Result};
use clap::Parser;
use marginalia_telemetry::{init_telemetry, TelemetryConfig};
use node_runtime::{Cli, NodeRuntime};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = &cli.log_level {
        telemetry = telemetry.with_log_level(level);
    }
    if cli.json_logs {
        telemetry.json_logs = true;
    }
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = cli.load_config().context("Failed to load configuration")?;
    let runtime = NodeRuntime::new(config).context("Failed to build subsystems")?;
    runtime.start().await.context("Failed to start node")?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
