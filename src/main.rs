//! URL Rewrite Service
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                  STARTUP (once)                      │
//!                 │  config.toml → validate → compile → register → freeze│
//!                 └──────────────────────────┬───────────────────────────┘
//!                                            │ AggregatedRuleSet (Arc)
//!                                            ▼
//!  Client Request  ┌─────────┐   ┌──────────────────┐   ┌──────────────┐
//!  ───────────────▶│  http   │──▶│  rewrite filter  │──▶│ pass-through │──▶ Upstream
//!                  │ server  │   │ forward/redirect │   │  (or 404)    │
//!                  └─────────┘   │     /proxy       │   └──────────────┘
//!                                └────────┬─────────┘
//!                                         │ proxy
//!                                         ▼
//!                                   Remote server
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use url_rewrite::config::{load_config, ServiceConfig};
use url_rewrite::lifecycle::signals::spawn_signal_handler;
use url_rewrite::observability::{logging, metrics};
use url_rewrite::{Bootstrap, Shutdown};

#[derive(Parser)]
#[command(name = "url-rewrite")]
#[command(about = "URL rewriting front service", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("url-rewrite v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        rule_entries = config.rewrite.entry_count(),
        request_timeout_secs = config.timeouts.request_secs,
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

    let bind_address = config.listener.bind_address.clone();
    let server = Bootstrap::new(config).into_server()?;

    // Rules are frozen; only now start accepting traffic.
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
