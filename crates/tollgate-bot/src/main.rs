//! Tollgate - Entry Point
//!
//! Replays a recorded event feed through the pre-trade risk engine.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Tollgate pre-trade risk replay
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TOLLGATE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tollgate_telemetry::init_logging()?;

    info!("Starting tollgate v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > TOLLGATE_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("TOLLGATE_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = tollgate_bot::AppConfig::from_file(&config_path)?;
    info!(
        gateway = %config.gateway_name,
        contracts = config.contracts.len(),
        "Configuration loaded"
    );

    let app = tollgate_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
