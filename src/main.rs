//! api-proxy: single-hop HTTP forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Caller                ┌──────────────────────────────────────────────┐
//!  ─────────────────────────┼─▶ http::server ─▶ http::handler              │
//!   {baseUrl, path,         │                     │ ForwardRequest          │
//!    payload, method}       │                     ▼                         │
//!                           │               forward::Forwarder ─────────────┼──▶ Target
//!                           │                 deadline + redirects          │
//!  ◀────────────────────────┼── http::envelope ◀─ ForwardResult ◀───────────┼─── server
//!   {request_url, headers,  │                                               │
//!    code, body}            └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use api_proxy::config::{loader, load_config};
use api_proxy::lifecycle::startup;
use api_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "api-proxy")]
#[command(about = "Forward described HTTP calls and return the response as a JSON envelope", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port, overriding the config file and PORT.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => loader::default_config()?,
    };
    if let Some(port) = cli.port {
        config.listener.set_port(port);
    }

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        timeout_ms = config.forwarder.timeout_ms,
        max_redirects = config.forwarder.max_redirects,
        "api-proxy starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
