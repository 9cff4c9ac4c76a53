//! Database MCP Server Library
//!
//! MCP (Model Context Protocol) tools for AI assistants to query SQL
//! databases (MySQL and PostgreSQL): named database configurations, lazy
//! connection pools, ad hoc SQL execution, and schema introspection.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod registry;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use db::ConnectionManager;
pub use error::{DbError, DbResult};
pub use mcp::DbService;
pub use registry::DatabaseRegistry;
