//! Policy Gateway
//!
//! Loads a TOML configuration, assembles the gateway and serves it over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ global request policies
//!                                         │
//!                                         ▼
//!                                  route matcher race ──(none)──▶ default origin
//!                                         │                              │
//!                                         ▼                              │
//!                         route request policies → origin                │
//!                                  → route response policies             │
//!                                         │                              │
//!                                         ▼                              │
//!     Client Response             global response policies ◀─────────────┘
//!     ◀──────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use policy_gateway::config::{load_config, GatewayConfig};
use policy_gateway::http::{ClientInfo, HttpServer};
use policy_gateway::observability::{logging, metrics};
use policy_gateway::Gateway;

#[derive(Parser, Debug)]
#[command(name = "policy-gateway", version, about = "HTTP gateway with policy chains")]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long, env = "POLICY_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if cli.check {
        config.build_gateway::<ClientInfo>()?;
        println!("configuration OK ({} routes)", config.routes.len());
        return Ok(());
    }

    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "policy-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
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

    let gateway: Arc<Gateway<ClientInfo>> = Arc::new(config.build_gateway()?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(&config, gateway).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
