//! Main entry point for the geoip-rs service

use anyhow::Context;
use clap::Parser;
use geoip_rs::cli::Cli;
use geoip_rs::AppConfig;
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = cli.load_config().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}, using defaults", e);
        AppConfig::default()
    });
    cli.apply(&mut config);

    // Initialize logging
    let default_level = if config.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    info!("Starting geoip-rs v{}", env!("CARGO_PKG_VERSION"));

    cli.run(config).await.context("geoip-rs exited with an error")?;

    Ok(())
}
