//! HTTP transport with Streamable HTTP support for the MCP server.
//!
//! Serves the MCP protocol over HTTP with SSE streaming responses,
//! suitable for web-based integrations.

use crate::db::ConnectionManager;
use crate::error::{DbError, DbResult};
use crate::mcp::DbService;
use crate::transport::Transport;
use crate::transport::stdio::wait_for_signal;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

pub struct HttpTransport {
    connection_manager: Arc<ConnectionManager>,
    /// Host to bind to
    host: String,
    /// Port to bind to
    port: u16,
    /// MCP endpoint path
    endpoint: String,
}

impl HttpTransport {
    /// Create a new HTTP transport bound to `host:port` serving MCP at
    /// `endpoint` (e.g. "/mcp").
    pub fn new(
        connection_manager: Arc<ConnectionManager>,
        host: impl Into<String>,
        port: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            connection_manager,
            host: host.into(),
            port,
            endpoint: endpoint.into(),
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the MCP endpoint path.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        info!("Starting MCP server with HTTP transport on {}", bind_addr);

        let connection_manager = self.connection_manager.clone();
        let service = StreamableHttpService::new(
            move || Ok(DbService::new(connection_manager.clone())),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service doesn't support the root path; use fallback_service there
        let app = if self.endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&self.endpoint, service)
        };

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::connection(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");

        // SSE connections may keep the server alive indefinitely, so force
        // exit after a timeout once a shutdown signal is received
        const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();

        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(DbError::unexpected(format!(
                            "HTTP server error: {}",
                            e
                        )));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );

                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        info!("Closing all database connection pools");
        self.connection_manager.teardown().await;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
