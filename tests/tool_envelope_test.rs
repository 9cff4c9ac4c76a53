//! Tool result envelope tests.
//!
//! Tool calls must always produce a structured envelope, even when the
//! database is unknown or unreachable.

use database_mcp::config::build_registry;
use database_mcp::db::ConnectionManager;
use database_mcp::registry::DatabaseRegistry;
use database_mcp::tools::{
    DescribeTableInput, ExecuteQueryInput, ListTablesInput, QueryToolHandler, SchemaToolHandler,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Reserve a local port and release it, so connecting is refused.
async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

fn manager_with(json: &str) -> Arc<ConnectionManager> {
    let registry = build_registry(json, "test").unwrap();
    Arc::new(ConnectionManager::new(registry))
}

#[tokio::test]
async fn execute_query_unknown_database_reports_config_error() {
    let manager = Arc::new(ConnectionManager::new(DatabaseRegistry::new()));
    let handler = QueryToolHandler::new(manager);

    let output = handler
        .execute_query(ExecuteQueryInput {
            database: "nope".to_string(),
            query: "SELECT 1".to_string(),
        })
        .await;

    assert!(!output.success);
    assert_eq!(output.database, "nope");
    let error = output.error.unwrap();
    assert!(error.contains("not configured"), "got: {error}");
    assert!(output.columns.is_none());
    assert!(output.rows_affected.is_none());
}

#[tokio::test]
async fn execute_query_unreachable_host_reports_connection_error() {
    let port = unused_port().await;
    let json = format!(
        r#"{{"databases": {{"dead": {{"type": "postgresql", "host": "127.0.0.1", "port": {port}, "user": "u", "password": "p", "database": "d"}}}}}}"#
    );
    let handler = QueryToolHandler::new(manager_with(&json));

    let output = handler
        .execute_query(ExecuteQueryInput {
            database: "dead".to_string(),
            query: "SELECT 1".to_string(),
        })
        .await;

    assert!(!output.success);
    let error = output.error.unwrap();
    assert!(error.starts_with("Connection error:"), "got: {error}");
    assert!(error.contains("dead"), "got: {error}");
}

#[tokio::test]
async fn failed_pool_creation_is_not_cached() {
    let port = unused_port().await;
    let json = format!(
        r#"{{"databases": {{"dead": {{"type": "mysql", "host": "127.0.0.1", "port": {port}, "user": "u", "database": "d"}}}}}}"#
    );
    let registry = build_registry(&json, "test").unwrap();
    let manager = ConnectionManager::new(registry);

    assert!(manager.get_pool("dead").await.is_err());
    assert_eq!(manager.pool_count().await, 0);
}

#[tokio::test]
async fn list_tables_unknown_database_reports_error_envelope() {
    let manager = Arc::new(ConnectionManager::new(DatabaseRegistry::new()));
    let handler = SchemaToolHandler::new(manager);

    let output = handler
        .list_tables(ListTablesInput {
            database: "ghost".to_string(),
        })
        .await;

    assert!(!output.success);
    assert!(output.tables.is_none());
    assert!(output.error.unwrap().contains("not configured"));
}

#[tokio::test]
async fn describe_table_unknown_database_reports_error_envelope() {
    let manager = Arc::new(ConnectionManager::new(DatabaseRegistry::new()));
    let handler = SchemaToolHandler::new(manager);

    let output = handler
        .describe_table(DescribeTableInput {
            database: "ghost".to_string(),
            table_name: "users".to_string(),
        })
        .await;

    assert!(!output.success);
    assert!(output.schema.is_none());
    assert!(output.error.is_some());
}

#[tokio::test]
async fn list_databases_reports_registration_order_without_credentials() {
    let json = r#"{
        "databases": {
            "dev": {"type": "mysql", "user": "app", "password": "secret", "database": "dev_db"},
            "stage": {"type": "postgresql", "port": 5433, "user": "app", "database": "stage_db"}
        }
    }"#;
    let handler = SchemaToolHandler::new(manager_with(json));

    let output = handler.list_databases();
    assert_eq!(output.count, 2);
    assert_eq!(output.databases[0].name, "dev");
    assert_eq!(output.databases[0].port, 3306);
    assert_eq!(output.databases[1].name, "stage");
    assert_eq!(output.databases[1].port, 5433);

    let serialized = serde_json::to_string(&output.databases).unwrap();
    assert!(!serialized.contains("secret"));
    assert!(!serialized.contains("password"));
}
