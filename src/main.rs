//! Generation relay (v1)
//!
//! ```text
//!     Client Request                ┌──────────────────────────────────────┐
//!     ──────────────────────────────▶  http server (request id, limits)    │
//!                                   │      │                               │
//!                                   │      ▼                               │
//!                                   │  relay::request (validate, default)  │
//!                                   │      │                               │
//!                                   │      ▼                               │
//!     Client Response               │  relay::client ──── POST + X-API-KEY ┼────▶ Generation
//!     ◀─────────────────────────────┼─ http::response ◀── status + body ───┼───── Backend
//!                                   └──────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use generate_relay::config::load_config;
use generate_relay::lifecycle::signals::forward_signals;
use generate_relay::observability::{logging, metrics};
use generate_relay::{RelayServer, Shutdown};

#[derive(Parser)]
#[command(name = "generate-relay")]
#[command(about = "Relays generation requests to a backend with a static API key", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("generate-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        relay_path = %config.listener.relay_path,
        downstream = ?config.downstream,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    forward_signals(shutdown.clone());

    let server = RelayServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
