//! MCP tool implementations.
//!
//! - `execute_query`: Run an arbitrary SQL statement against a configured database
//! - `list_tables`: List base tables in a database
//! - `describe_table`: Get table schema information
//! - `list_databases`: List configured databases (no connection required)

pub mod query;
pub mod schema;

pub use query::{ExecuteQueryInput, ExecuteQueryOutput, QueryToolHandler};
pub use schema::{
    DescribeTableInput, DescribeTableOutput, ListDatabasesOutput, ListTablesInput,
    ListTablesOutput, SchemaToolHandler,
};
