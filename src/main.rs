//! portfolio-gate
//!
//! Security gateway in front of the portfolio site renderer.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────────┐
//!                        │                 PORTFOLIO GATE                  │
//!                        │                                                │
//!   Client Request       │  ┌──────────┐   ┌──────────────┐               │
//!   ─────────────────────┼─▶│ request  │──▶│ request gate │               │
//!                        │  │ id/trace │   │ classify     │               │
//!                        │  └──────────┘   │ shape check  │               │
//!                        │                 │ rate limit   │               │
//!                        │                 └──────┬───────┘               │
//!                        │            ┌───────────┴───────────┐           │
//!                        │            ▼                       ▼           │
//!                        │   ┌────────────────┐     ┌────────────────┐    │
//!                        │   │ admin routes   │     │ upstream       │────┼──▶ Site
//!                        │   │ login throttle │     │ forwarding     │    │    Renderer
//!                        │   │ token verify   │     └────────────────┘    │
//!                        │   └───────┬────────┘                           │
//!                        │           ▼                                    │
//!                        │   ┌────────────────┐                           │
//!                        │   │ alerts         │───────────────────────────┼──▶ Telegram
//!                        │   └────────────────┘                           │
//!                        └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use portfolio_gate::config::loader::load_config;
use portfolio_gate::http::{AppState, HttpServer};
use portfolio_gate::lifecycle::{signals::wait_for_signal, Shutdown};
use portfolio_gate::observability::{logging::init_logging, metrics::init_metrics};
use portfolio_gate::security::clock::SystemClock;

#[derive(Parser)]
#[command(name = "portfolio-gate", version, about = "Rate limiting and admin authentication gate")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "PORTFOLIO_GATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    init_logging(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "portfolio-gate starting");
    tracing::info!(
        environment = config.environment.as_str(),
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let state = AppState::new(config, Arc::new(SystemClock));
    let counters = state.counters.clone();

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    HttpServer::new(state).run(listener, shutdown).await?;

    counters.dispose();
    tracing::info!("Shutdown complete");
    Ok(())
}
