//! Transport layer for the MCP server.
//!
//! Two transports carry the protocol: stdio for CLI hosts and streamable
//! HTTP for web clients. Both hold the shared connection manager and tear
//! down its pools on shutdown.

pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use crate::error::DbResult;
use std::future::Future;

/// Trait for MCP transport implementations.
pub trait Transport: Send + Sync {
    /// Start the transport and block until it shuts down.
    fn run(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}
