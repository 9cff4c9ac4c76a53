//! Query execution tool.
//!
//! Implements the `execute_query` MCP tool. Results come back in a structured
//! envelope: a `success` flag plus either row data, a `rows_affected` count,
//! or an error message. Failures never propagate as protocol errors.

use crate::db::{ConnectionManager, QueryExecutor};
use crate::error::DbError;
use crate::models::QueryResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, warn};

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// Name of the configured database to run against
    pub database: String,
    /// SQL statement to execute
    pub query: String,
}

/// Output envelope for the execute_query tool.
///
/// Exactly one of the row-result fields (`columns`/`data`/`row_count`) or
/// `rows_affected` is present on success; `error` is present on failure.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExecuteQueryOutput {
    /// Whether the statement executed without error
    pub success: bool,
    /// The database the statement ran against
    pub database: String,
    /// Column names in result order, for row-returning statements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Result rows as column-name-to-value maps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Map<String, JsonValue>>>,
    /// Number of rows returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    /// Rows affected, for mutation statements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
    /// Error message when success is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecuteQueryOutput {
    /// Build a success envelope from an execution result.
    pub fn ok(database: impl Into<String>, result: QueryResult) -> Self {
        Self {
            success: true,
            database: database.into(),
            columns: result.columns,
            data: result.data,
            row_count: result.row_count,
            rows_affected: result.rows_affected,
            error: None,
        }
    }

    /// Build a failure envelope carrying the error message.
    pub fn err(database: impl Into<String>, error: &DbError) -> Self {
        Self {
            success: false,
            database: database.into(),
            columns: None,
            data: None,
            row_count: None,
            rows_affected: None,
            error: Some(error.to_string()),
        }
    }
}

/// Handler for query execution.
pub struct QueryToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl QueryToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// Handle the execute_query tool call.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> ExecuteQueryOutput {
        match self.run(&input).await {
            Ok(result) => {
                info!(
                    database = %input.database,
                    row_count = result.row_count,
                    rows_affected = result.rows_affected,
                    "Query executed"
                );
                ExecuteQueryOutput::ok(&input.database, result)
            }
            Err(err) => {
                warn!(
                    database = %input.database,
                    category = err.category(),
                    error = %err,
                    "Query failed"
                );
                ExecuteQueryOutput::err(&input.database, &err)
            }
        }
    }

    async fn run(&self, input: &ExecuteQueryInput) -> Result<QueryResult, DbError> {
        let pool = self.connection_manager.get_pool(&input.database).await?;
        QueryExecutor::execute(&pool, &input.query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_deserialization() {
        let json = r#"{
            "database": "analytics",
            "query": "SELECT * FROM users WHERE id = 42"
        }"#;

        let input: ExecuteQueryInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.database, "analytics");
        assert_eq!(input.query, "SELECT * FROM users WHERE id = 42");
    }

    #[test]
    fn test_row_output_shape() {
        let mut row = serde_json::Map::new();
        row.insert("id".to_string(), JsonValue::Number(1.into()));
        let result = QueryResult::rows(vec!["id".to_string()], vec![row]);

        let output = ExecuteQueryOutput::ok("analytics", result);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"row_count\":1"));
        assert!(json.contains("\"columns\":[\"id\"]"));
        assert!(!json.contains("rows_affected"));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_mutation_output_shape() {
        let output = ExecuteQueryOutput::ok("analytics", QueryResult::mutation(3));
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"rows_affected\":3"));
        assert!(!json.contains("columns"));
        assert!(!json.contains("row_count"));
    }

    #[test]
    fn test_error_output_shape() {
        let err = DbError::syntax("syntax error at or near \"SELEC\"");
        let output = ExecuteQueryOutput::err("analytics", &err);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("SQL syntax error:"));
        assert!(!json.contains("columns"));
    }
}
