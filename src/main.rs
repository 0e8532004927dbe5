//! Subdomain reverse proxy.
//!
//! Serves several upstream origins under subdomains of one domain, rewriting
//! links and redirects so clients stay on the proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ http::server ──▶ routing (Host → RouteRule)
//!                             │                   │
//!                             │                   ▼
//!                             │            security::auth (401?)
//!                             │                   │
//!                             │                   ▼
//!     Client Response         │            proxy::forwarder ──────▶ Upstream
//!     ◀───────────────── rewrite (CSP, Location, body) ◀────────── (TLS)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use subdomain_proxy::config::loader;
use subdomain_proxy::error::StartupError;
use subdomain_proxy::lifecycle::{signals, Shutdown};
use subdomain_proxy::observability::{logging, metrics};
use subdomain_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "subdomain-proxy")]
#[command(about = "Host-based reverse proxy with link rewriting", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; PROXY_DOMAIN, PORT and AUTH override it.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = loader::resolve(cli.config.as_deref(), |key| std::env::var(key).ok())
        .map_err(StartupError::from)?;

    logging::init(&config.observability.log_level);

    tracing::info!("subdomain-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        domain = %config.domain,
        routes = config.routes.len(),
        request_timeout_secs = ?config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr).map_err(StartupError::from)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(StartupError::from)?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
