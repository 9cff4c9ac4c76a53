//! Data models for the database MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod database;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use database::{DatabaseConfig, DatabaseEntry, DatabaseInfo, Dialect};
pub use query::{QUERY_TIMEOUT_SECS, QueryResult};
pub use schema::{ColumnDefinition, ForeignKey, ForeignKeyAction, IndexInfo, TableSchema};
