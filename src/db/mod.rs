//! Database access layer.
//!
//! - Connection pool management
//! - SQL statement classification
//! - Query execution
//! - Schema introspection
//! - Row-to-JSON type mappings

pub mod executor;
pub mod pool;
pub mod schema;
pub mod statement;
pub mod types;

pub use executor::QueryExecutor;
pub use pool::{ConnectionManager, DbPool};
pub use schema::SchemaInspector;
