//! MCP service implementation using rmcp.
//!
//! Defines the DbService struct exposing the database tools over the MCP
//! protocol via the rmcp framework's macros. Tool failures are reported
//! inside each tool's `success`/`error` envelope rather than as protocol
//! errors, so callers always get structured output back.

use crate::db::ConnectionManager;
use crate::tools::query::{ExecuteQueryInput, ExecuteQueryOutput, QueryToolHandler};
use crate::tools::schema::{
    DescribeTableInput, DescribeTableOutput, ListDatabasesOutput, ListTablesInput,
    ListTablesOutput, SchemaToolHandler,
};
use rmcp::Json;
use rmcp::{
    ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct DbService {
    /// Shared connection manager for all database operations
    connection_manager: Arc<ConnectionManager>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl DbService {
    /// Create a new DbService instance.
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self {
            connection_manager,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl DbService {
    #[tool(
        description = "List all configured databases.\nReturns names, types (MySQL/PostgreSQL), hosts, and descriptions. Call this first to see what is available. No connection is opened."
    )]
    async fn list_databases(&self) -> Json<ListDatabasesOutput> {
        let handler = SchemaToolHandler::new(self.connection_manager.clone());
        Json(handler.list_databases())
    }

    #[tool(
        description = "Execute a SQL statement against a configured database.\nSELECT and other row-returning statements return columns and rows; INSERT/UPDATE/DELETE/DDL return the affected row count.\nOn failure the result has success=false and an error message."
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Json<ExecuteQueryOutput> {
        let handler = QueryToolHandler::new(self.connection_manager.clone());
        Json(handler.execute_query(input).await)
    }

    #[tool(
        description = "List base tables in a configured database.\nReturns table names sorted alphabetically. Views are not included."
    )]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Json<ListTablesOutput> {
        let handler = SchemaToolHandler::new(self.connection_manager.clone());
        Json(handler.list_tables(input).await)
    }

    #[tool(
        description = "Get detailed schema information for a table.\nReturns columns (with types, nullability, defaults), primary keys, foreign keys, and indexes."
    )]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<DescribeTableInput>,
    ) -> Json<DescribeTableOutput> {
        let handler = SchemaToolHandler::new(self.connection_manager.clone());
        Json(handler.describe_table(input).await)
    }
}

#[tool_handler]
impl ServerHandler for DbService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "database-mcp".to_owned(),
                title: Some("Database MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "SQL tools for querying MySQL and PostgreSQL databases.\n\
                \n\
                ## Workflow\n\
                1. Call `list_databases` to see the configured database names\n\
                2. Use a name from step 1 as the `database` parameter in other tools\n\
                3. Explore with `list_tables` and `describe_table`, then run SQL with `execute_query`\n\
                \n\
                ## Notes\n\
                - Connections are opened lazily on first use and pooled afterwards.\n\
                - `execute_query` accepts any SQL the backend accepts, including writes and DDL.\n\
                - Statements time out after 300 seconds.\n\
                - Tool results carry a `success` flag; on failure read the `error` field."
                    .to_string(),
            ),
        }
    }
}
