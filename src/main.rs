//! Database MCP Server - Main entry point.
//!
//! MCP (Model Context Protocol) server exposing SQL query and schema
//! introspection tools for MySQL and PostgreSQL databases.

use clap::Parser;
use database_mcp::config::{Config, TransportMode};
use database_mcp::db::ConnectionManager;
use database_mcp::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdio transport speaks JSON-RPC on stdout, so logs go to stderr
    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    info!(
        transport = %config.transport,
        "Starting database MCP server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let registry = config.load_registry()?;
    if registry.is_empty() {
        warn!(
            "No databases configured; set --config or DATABASE_CONFIG_JSON to register databases"
        );
    } else {
        info!(count = registry.len(), "Databases configured");
    }

    let connection_manager = Arc::new(ConnectionManager::new(registry));

    let result = match config.transport {
        TransportMode::Stdio => {
            let transport = StdioTransport::new(connection_manager);
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(
                connection_manager,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
