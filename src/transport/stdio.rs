//! Stdio transport for the MCP server.
//!
//! Reads JSON-RPC messages from stdin and writes responses to stdout,
//! the standard mode for CLI-based MCP integrations.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::DbService;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

pub struct StdioTransport {
    connection_manager: Arc<ConnectionManager>,
}

impl StdioTransport {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = DbService::new(self.connection_manager.clone());

        let transport = stdio();
        let running_service = service
            .serve(transport)
            .await
            .map_err(|e| DbError::unexpected(format!("Failed to start stdio transport: {}", e)))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => {
                        info!("Stdio transport completed normally");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stdio transport error");
                        return Err(DbError::unexpected(format!(
                            "Stdio transport error: {}",
                            e
                        )));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            // Second signal forces immediate exit
            tokio::spawn(async {
                wait_for_signal().await;
                tracing::warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        info!("Closing all database connection pools");
        self.connection_manager.teardown().await;

        if shutdown_requested {
            // tokio::select! cannot interrupt a blocking stdin read, so the
            // process is exited directly
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
pub(crate) async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DatabaseRegistry;

    #[test]
    fn test_stdio_transport_creation() {
        let manager = Arc::new(ConnectionManager::new(DatabaseRegistry::new()));
        let transport = StdioTransport::new(manager);
        assert_eq!(transport.name(), "stdio");
    }
}
