//! Schema introspection tools.
//!
//! Implements the `list_tables`, `describe_table`, and `list_databases` MCP
//! tools. Like the query tool, the first two report failures inside a
//! `success`/`error` envelope; `list_databases` reads only local
//! configuration and cannot fail.

use crate::db::{ConnectionManager, SchemaInspector};
use crate::error::DbError;
use crate::models::{DatabaseInfo, TableSchema};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Name of the configured database to inspect
    pub database: String,
}

/// Output envelope for the list_tables tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListTablesOutput {
    /// Whether the listing succeeded
    pub success: bool,
    /// The database that was inspected
    pub database: String,
    /// Base table names, sorted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<String>>,
    /// Number of tables found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Error message when success is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Input for the describe_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DescribeTableInput {
    /// Name of the configured database to inspect
    pub database: String,
    /// Table to describe
    pub table_name: String,
}

/// Output envelope for the describe_table tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DescribeTableOutput {
    /// Whether the description succeeded
    pub success: bool,
    /// The database that was inspected
    pub database: String,
    /// Full table schema on success, flattened into the envelope
    #[serde(flatten)]
    pub schema: Option<TableSchema>,
    /// Error message when success is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output for the list_databases tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListDatabasesOutput {
    /// Configured databases in registration order, credentials omitted
    pub databases: Vec<DatabaseInfo>,
    /// Number of configured databases
    pub count: usize,
}

/// Handler for schema introspection tools.
pub struct SchemaToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl SchemaToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// Handle the list_tables tool call.
    pub async fn list_tables(&self, input: ListTablesInput) -> ListTablesOutput {
        match self.tables(&input.database).await {
            Ok(tables) => {
                info!(database = %input.database, count = tables.len(), "Listed tables");
                ListTablesOutput {
                    success: true,
                    database: input.database,
                    count: Some(tables.len()),
                    tables: Some(tables),
                    error: None,
                }
            }
            Err(err) => {
                warn!(database = %input.database, error = %err, "list_tables failed");
                ListTablesOutput {
                    success: false,
                    database: input.database,
                    tables: None,
                    count: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Handle the describe_table tool call.
    pub async fn describe_table(&self, input: DescribeTableInput) -> DescribeTableOutput {
        match self.schema(&input.database, &input.table_name).await {
            Ok(schema) => {
                info!(
                    database = %input.database,
                    table = %input.table_name,
                    columns = schema.columns.len(),
                    "Described table"
                );
                DescribeTableOutput {
                    success: true,
                    database: input.database,
                    schema: Some(schema),
                    error: None,
                }
            }
            Err(err) => {
                warn!(
                    database = %input.database,
                    table = %input.table_name,
                    error = %err,
                    "describe_table failed"
                );
                DescribeTableOutput {
                    success: false,
                    database: input.database,
                    schema: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Handle the list_databases tool call. Reads configuration only; no
    /// connections are opened.
    pub fn list_databases(&self) -> ListDatabasesOutput {
        let databases = self.connection_manager.list_databases();
        ListDatabasesOutput {
            count: databases.len(),
            databases,
        }
    }

    async fn tables(&self, database: &str) -> Result<Vec<String>, DbError> {
        let pool = self.connection_manager.get_pool(database).await?;
        SchemaInspector::list_tables(&pool).await
    }

    async fn schema(&self, database: &str, table_name: &str) -> Result<TableSchema, DbError> {
        let pool = self.connection_manager.get_pool(database).await?;
        SchemaInspector::describe_table(&pool, table_name).await
    }
}
