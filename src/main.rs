//! Ergo payment verification gateway
//!
//! A small HTTP facade over the Ergo explorer that confirms a transaction
//! pays a merchant enough, with enough confirmations.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ security (CORS, rate limit, body limit)
//!                         │
//!                         ▼
//!                     http handlers ──▶ validation
//!                         │
//!                         ▼
//!                     blockchain::ExplorerClient ──▶ Ergo explorer API
//!                         │
//!                         ▼
//!                     payments::PaymentVerifier
//!                         │
//!     Client Response     ▼
//!     ◀────────────── http response (verified / error envelope)
//! ```

use std::path::PathBuf;

use clap::Parser;

use ergopay_gateway::config;
use ergopay_gateway::lifecycle::{self, Shutdown};
use ergopay_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "ergopay-gateway")]
#[command(about = "Ergo payment verification gateway", version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ERGOPAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!("ergopay-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        explorer = %config.explorer.base_url,
        network = %config.explorer.network,
        min_confirmations = config.verification.min_confirmations,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    lifecycle::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
