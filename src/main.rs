//! Path-based reverse proxy (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────┐
//!                              │                  PATH PROXY                          │
//!                              │                                                      │
//!     Client Request           │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!     ─────────────────────────┼─▶│  http   │───▶│ dispatch │───▶│   routing    │     │
//!                              │  │ server  │    │          │    │ registry +   │     │
//!                              │  └─────────┘    └────┬─────┘    │ templates    │     │
//!                              │                      │          └──────────────┘     │
//!                              │                      ▼                               │
//!                              │               ┌──────────────┐                       │
//!                              │               │load_balancer │ (per route)           │
//!                              │               └──────┬───────┘                       │
//!                              │                      ▼                               │
//!     Client Response          │               ┌──────────────┐                       │
//!     ◀────────────────────────┼───────────────│  forwarder   │◀──────────────────────┼──── Backend
//!                              │               └──────────────┘                       │
//!                              │                                                      │
//!                              │  admin API ──▶ registry (set/remove route, hosts)    │
//!                              └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use path_proxy::config::loader::load_config;
use path_proxy::config::watcher::ConfigWatcher;
use path_proxy::lifecycle::signals::shutdown_on_signal;
use path_proxy::observability::{logging, metrics};
use path_proxy::{HttpServer, ProxyConfig, Shutdown};

#[derive(Parser)]
#[command(name = "path-proxy")]
#[command(about = "Path-based reverse proxy router", long_about = None)]
struct Args {
    /// TOML configuration file. Watched for changes when given.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("path-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the life of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
