//! Query result data model.
//!
//! A `QueryResult` takes exactly one of two shapes: row-returning statements
//! populate `columns`/`data`/`row_count`, mutations populate `rows_affected`.
//! The constructors are the only way to build one, so mixed shapes cannot
//! occur.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Query execution timeout in seconds.
pub const QUERY_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Map<String, JsonValue>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
}

impl QueryResult {
    /// Create a result for a row-returning statement.
    ///
    /// An empty result set keeps the rows shape: empty columns, empty data,
    /// row_count zero.
    pub fn rows(columns: Vec<String>, data: Vec<serde_json::Map<String, JsonValue>>) -> Self {
        let row_count = data.len();
        Self {
            columns: Some(columns),
            data: Some(data),
            row_count: Some(row_count),
            rows_affected: None,
        }
    }

    /// Create a result for a mutation (INSERT/UPDATE/DELETE/DDL).
    pub fn mutation(rows_affected: u64) -> Self {
        Self {
            columns: None,
            data: None,
            row_count: None,
            rows_affected: Some(rows_affected),
        }
    }

    /// Check whether this result carries rows rather than an affected count.
    pub fn is_row_returning(&self) -> bool {
        self.data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_shape() {
        let mut row = serde_json::Map::new();
        row.insert("id".to_string(), serde_json::json!(1));
        let result = QueryResult::rows(vec!["id".to_string()], vec![row]);

        assert!(result.is_row_returning());
        assert_eq!(result.row_count, Some(1));
        assert_eq!(result.rows_affected, None);
    }

    #[test]
    fn test_empty_rows_keep_rows_shape() {
        let result = QueryResult::rows(Vec::new(), Vec::new());
        assert!(result.is_row_returning());
        assert_eq!(result.row_count, Some(0));
        assert_eq!(result.rows_affected, None);
    }

    #[test]
    fn test_mutation_shape() {
        let result = QueryResult::mutation(5);
        assert!(!result.is_row_returning());
        assert_eq!(result.rows_affected, Some(5));
        assert_eq!(result.row_count, None);

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("columns"));
        assert!(!json.contains("row_count"));
        assert!(json.contains("\"rows_affected\":5"));
    }
}
