//! The MCP tool dispatcher.
//!
//! `SteampipeService` registers the four database tools with rmcp's static
//! tool router. Routing is a compile-time mapping from tool name to handler
//! method; the service itself carries no per-call state beyond the shared
//! connection manager inside its handlers.

use crate::db::{ConnectionManager, QueryExecutor};
use crate::tools::query::{QueryInput, QueryOutput, QueryToolHandler};
use crate::tools::schema::{
    GetTableSchemaInput, GetTableSchemaOutput, ListAllTablesOutput, ListTablesInSchemaInput,
    ListTablesInSchemaOutput, SchemaToolHandler,
};
use rmcp::{
    ErrorData as McpError, Json, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct SteampipeService {
    query_handler: QueryToolHandler,
    schema_handler: SchemaToolHandler,
    tool_router: ToolRouter<Self>,
}

impl SteampipeService {
    /// Build the service around a shared connection manager. The default
    /// query timeout comes from configuration; individual calls may pass a
    /// shorter or longer `timeout_secs`.
    pub fn new(connection_manager: Arc<ConnectionManager>, query_timeout_secs: u64) -> Self {
        Self {
            query_handler: QueryToolHandler::with_executor(
                connection_manager.clone(),
                QueryExecutor::with_default_timeout(query_timeout_secs),
            ),
            schema_handler: SchemaToolHandler::new(connection_manager),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl SteampipeService {
    #[tool(
        description = "Run a read-only SQL query against the database and return rows as JSON.\nOnly SELECT, WITH, EXPLAIN, and SHOW statements are allowed; the statement runs in a READ ONLY transaction.\nSupports positional parameters ($1, $2, ...) to prevent SQL injection."
    )]
    async fn query(
        &self,
        Parameters(input): Parameters<QueryInput>,
    ) -> Result<Json<QueryOutput>, McpError> {
        self.query_handler
            .query(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "List all tables in all non-system schemas.\nReturns {schema, table} pairs ordered by schema then table name.\nIncludes Steampipe foreign tables."
    )]
    async fn list_all_tables(&self) -> Result<Json<ListAllTablesOutput>, McpError> {
        self.schema_handler
            .list_all_tables()
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "List all tables in a specified schema.\nReturns table names ordered alphabetically."
    )]
    async fn list_tables_in_schema(
        &self,
        Parameters(input): Parameters<ListTablesInSchemaInput>,
    ) -> Result<Json<ListTablesInSchemaOutput>, McpError> {
        self.schema_handler
            .list_tables_in_schema(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Get the column names and data types for a specific table.\nExpects the table name in the format 'schema.table'.\nAn unknown table returns an empty column list."
    )]
    async fn get_table_schema(
        &self,
        Parameters(input): Parameters<GetTableSchemaInput>,
    ) -> Result<Json<GetTableSchemaOutput>, McpError> {
        self.schema_handler
            .get_table_schema(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }
}

#[tool_handler]
impl ServerHandler for SteampipeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "steampipe-mcp-server".to_owned(),
                title: Some("Steampipe MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only tools for querying a Steampipe/PostgreSQL database.\n\
                \n\
                ## Workflow\n\
                1. Call `list_all_tables` to discover available tables, or\n\
                   `list_tables_in_schema` to browse one schema\n\
                2. Call `get_table_schema` with 'schema.table' to see columns and types\n\
                3. Call `query` with a SELECT statement; use $1, $2, ... placeholders\n\
                   with `params` for user-supplied values\n\
                \n\
                ## Restrictions\n\
                - Only SELECT, WITH, EXPLAIN, and SHOW statements are accepted\n\
                - One statement per call; chained statements are rejected\n\
                - Every query runs inside a READ ONLY transaction\n\
                \n\
                ## Steampipe\n\
                Plugin data appears as foreign tables, one schema per data source\n\
                (e.g. `aws.aws_s3_bucket`). Table listings include foreign tables."
                    .to_string(),
            ),
        }
    }
}
