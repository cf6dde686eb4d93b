//! Single-target HTTP forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 FORWARD PROXY                 │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │
//!   ─────────────────┼─▶│  http   │───▶│ forward  │───▶│ target  │──┼──▶ Upstream
//!                    │  │ server  │    │  client  │    │   URL   │  │    (Apps Script)
//!                    │  └─────────┘    └──────────┘    └─────────┘  │
//!                    │                                               │
//!   Client Response  │  ┌─────────┐                                  │
//!   ◀────────────────┼──│response │◀── relay body / error envelope   │
//!                    │  └─────────┘                                  │
//!                    │                                               │
//!                    │  ┌─────────────────────────────────────────┐  │
//!                    │  │        Cross-Cutting Concerns           │  │
//!                    │  │  config   request IDs   lifecycle/logs  │  │
//!                    │  └─────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::loader::load_config;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Single-target HTTP forwarding proxy", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration (env vars override file values)
    let config = load_config(args.config.as_deref())?;

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "forward_proxy={},tower_http=info",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("forward-proxy v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        target_url = %config.target.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Wire shutdown: OS signal → broadcast → graceful drain
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        lifecycle::signals::wait_for_signal().await;
        shutdown.trigger();
    });

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
