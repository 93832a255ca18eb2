//! Chronicle Web Server
//!
//! HTTP front end for tiered historical research.

use anyhow::Context;
use chronicle_core::Settings;
use chronicle_web::{init_logging, AppState, ChronicleServer};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// Chronicle Web Server - tiered historical research API
#[derive(Parser)]
#[command(name = "chronicle-web")]
#[command(about = "HTTP API for Chronicle tiered historical research")]
#[command(version)]
struct Args {
    /// Server host to bind to (defaults to api_host)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (defaults to api_port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(host) = args.host {
        settings.api_host = host;
    }
    if let Some(port) = args.port {
        settings.api_port = port;
    }

    init_logging(&settings, args.log_level.as_deref()).context("Failed to initialize logging")?;

    if !settings.is_tier2_available() {
        warn!("Tier 2 is not configured; deep research will fall back to Tier 1");
    }

    let address = settings.api_address();
    let state = AppState::new(settings).context("Failed to build research services")?;
    info!("Chronicle web server v{}", env!("CARGO_PKG_VERSION"));

    ChronicleServer::new(address, state)
        .start()
        .await
        .context("Server terminated with an error")?;
    Ok(())
}
