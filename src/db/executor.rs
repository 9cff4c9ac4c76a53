//! Query execution engine.
//!
//! The executor classifies each statement (see [`crate::db::statement`]) and
//! either fetches a result set or runs it for its affected-row count, so both
//! paths produce the uniform [`QueryResult`] shape. Execution uses raw
//! (unprepared) SQL; some statements, DDL in particular, cannot run as
//! prepared statements on MySQL. Preparing is only attempted to recover
//! column names when a result set comes back empty.
//!
//! The dialect-specific plumbing lives in the `mysql` and `postgres`
//! submodules, kept intentionally parallel so differences stand out.

use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::debug;

use crate::db::pool::DbPool;
use crate::db::statement;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{QUERY_TIMEOUT_SECS, QueryResult};

/// Stateless query executor.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Execute arbitrary SQL against a pool.
    ///
    /// Row-returning statements yield columns and data; everything else
    /// yields an affected-row count.
    pub async fn execute(pool: &DbPool, sql: &str) -> DbResult<QueryResult> {
        let query_timeout = Duration::from_secs(QUERY_TIMEOUT_SECS);
        let start = Instant::now();
        let fetch = statement::returns_rows(sql, pool.dialect());

        debug!(
            dialect = %pool.dialect(),
            returns_rows = fetch,
            "Executing statement"
        );

        let result = if fetch {
            // An empty set carries no row metadata, so the column names are
            // recovered by preparing the statement instead.
            match pool {
                DbPool::MySql(p) => {
                    let rows = mysql::fetch_rows(p, sql, query_timeout).await?;
                    if rows.is_empty() {
                        QueryResult::rows(mysql::result_columns(p, sql).await, Vec::new())
                    } else {
                        rows_to_result(rows)
                    }
                }
                DbPool::Postgres(p) => {
                    let rows = postgres::fetch_rows(p, sql, query_timeout).await?;
                    if rows.is_empty() {
                        QueryResult::rows(postgres::result_columns(p, sql).await, Vec::new())
                    } else {
                        rows_to_result(rows)
                    }
                }
            }
        } else {
            let rows_affected = match pool {
                DbPool::MySql(p) => mysql::execute_write(p, sql, query_timeout).await?,
                DbPool::Postgres(p) => postgres::execute_write(p, sql, query_timeout).await?,
            };
            QueryResult::mutation(rows_affected)
        };

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Statement finished"
        );
        Ok(result)
    }
}

/// Convert fetched rows into a result; column names come from the first row.
fn rows_to_result<R: RowToJson>(rows: Vec<R>) -> QueryResult {
    let columns = rows.first().map(|r| r.column_names()).unwrap_or_default();
    let data = rows.iter().map(|r| r.to_json_map()).collect();
    QueryResult::rows(columns, data)
}

// =============================================================================
// Common Helper Functions
// =============================================================================

fn collect_rows<R>(results: Vec<Result<R, sqlx::Error>>) -> DbResult<Vec<R>> {
    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result.map_err(DbError::from)?);
    }
    Ok(rows)
}

fn timeout_error(query_timeout: Duration) -> DbError {
    DbError::connection(format!(
        "Statement exceeded the {}s execution timeout",
        query_timeout.as_secs()
    ))
}

// =============================================================================
// Dialect-Specific Implementations
// =============================================================================

mod mysql {
    use futures_util::StreamExt;
    use sqlx::MySqlPool;
    use sqlx::mysql::MySqlRow;

    use super::*;

    pub async fn fetch_rows(
        pool: &MySqlPool,
        sql: &str,
        query_timeout: Duration,
    ) -> DbResult<Vec<MySqlRow>> {
        use sqlx::Executor;
        let rows_future = pool.fetch(sql).collect::<Vec<_>>();
        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error(query_timeout)),
        }
    }

    /// Column names for a statement that produced no rows. Preparing the
    /// statement yields the metadata the empty set lacks; statements the
    /// backend refuses to prepare report no columns.
    pub async fn result_columns(pool: &MySqlPool, sql: &str) -> Vec<String> {
        use sqlx::{Column, Executor, Statement};
        match pool.prepare(sql).await {
            Ok(stmt) => stmt.columns().iter().map(|c| c.name().to_string()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub async fn execute_write(
        pool: &MySqlPool,
        sql: &str,
        query_timeout: Duration,
    ) -> DbResult<u64> {
        use sqlx::Executor;
        match timeout(query_timeout, pool.execute(sql)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(DbError::from(e)),
            Err(_) => Err(timeout_error(query_timeout)),
        }
    }
}

mod postgres {
    use futures_util::StreamExt;
    use sqlx::PgPool;
    use sqlx::postgres::PgRow;

    use super::*;

    pub async fn fetch_rows(
        pool: &PgPool,
        sql: &str,
        query_timeout: Duration,
    ) -> DbResult<Vec<PgRow>> {
        use sqlx::Executor;
        let rows_future = pool.fetch(sql).collect::<Vec<_>>();
        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error(query_timeout)),
        }
    }

    /// Column names for a statement that produced no rows, recovered by
    /// preparing it.
    pub async fn result_columns(pool: &PgPool, sql: &str) -> Vec<String> {
        use sqlx::{Column, Executor, Statement};
        match pool.prepare(sql).await {
            Ok(stmt) => stmt.columns().iter().map(|c| c.name().to_string()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub async fn execute_write(
        pool: &PgPool,
        sql: &str,
        query_timeout: Duration,
    ) -> DbResult<u64> {
        use sqlx::Executor;
        match timeout(query_timeout, pool.execute(sql)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(DbError::from(e)),
            Err(_) => Err(timeout_error(query_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeRow(Vec<(&'static str, serde_json::Value)>);

    impl RowToJson for FakeRow {
        fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
            self.0
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect()
        }

        fn column_names(&self) -> Vec<String> {
            self.0.iter().map(|(k, _)| k.to_string()).collect()
        }
    }

    #[test]
    fn test_rows_to_result_preserves_column_order() {
        let rows = vec![
            FakeRow(vec![("id", json!(1)), ("name", json!("a"))]),
            FakeRow(vec![("id", json!(2)), ("name", json!("b"))]),
        ];
        let result = rows_to_result(rows);
        assert_eq!(
            result.columns,
            Some(vec!["id".to_string(), "name".to_string()])
        );
        assert_eq!(result.row_count, Some(2));
        assert_eq!(result.data.as_ref().unwrap()[1]["name"], json!("b"));
    }

    #[test]
    fn test_empty_set_keeps_recovered_columns() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let result = QueryResult::rows(columns.clone(), Vec::new());
        assert!(result.is_row_returning());
        assert_eq!(result.columns, Some(columns));
        assert_eq!(result.row_count, Some(0));
        assert_eq!(result.rows_affected, None);
    }
}
