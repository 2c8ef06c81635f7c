//! The three introspection tools: `list_all_tables`, `list_tables_in_schema`,
//! and `get_table_schema`.

use crate::db::{ConnectionManager, SchemaInspector};
use crate::error::{DbError, DbResult};
use crate::models::{ColumnInfo, QualifiedTable, TableRef};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Output for the list_all_tables tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListAllTablesOutput {
    /// Tables in all non-system schemas, ordered by schema then table name
    pub tables: Vec<TableRef>,
    /// Number of tables found
    pub count: usize,
}

/// Input for the list_tables_in_schema tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInSchemaInput {
    /// Name of the schema
    pub schema: String,
}

/// Output for the list_tables_in_schema tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListTablesInSchemaOutput {
    /// Schema that was listed
    pub schema: String,
    /// Table names in the schema, ordered by name
    pub tables: Vec<String>,
    /// Number of tables found
    pub count: usize,
}

/// Input for the get_table_schema tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTableSchemaInput {
    /// Name of the table with schema, i.e. public.my_table
    pub table: String,
}

/// Output for the get_table_schema tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetTableSchemaOutput {
    /// The qualified table name that was described
    pub table: String,
    /// Columns ordered by ordinal position; empty when the table does not exist
    pub columns: Vec<ColumnInfo>,
    /// Number of columns found
    pub count: usize,
}

/// Handler for schema introspection tools.
#[derive(Clone)]
pub struct SchemaToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl SchemaToolHandler {
    /// Create a new schema tool handler.
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// List tables across all non-system schemas.
    pub async fn list_all_tables(&self) -> DbResult<ListAllTablesOutput> {
        let tables = SchemaInspector::list_all_tables(self.connection_manager.pool()).await?;
        let count = tables.len();

        info!(count = count, "Listed all tables");

        Ok(ListAllTablesOutput { tables, count })
    }

    /// List tables in one schema.
    pub async fn list_tables_in_schema(
        &self,
        input: ListTablesInSchemaInput,
    ) -> DbResult<ListTablesInSchemaOutput> {
        let schema = input.schema.trim();
        if schema.is_empty() {
            return Err(DbError::validation("Schema name cannot be empty"));
        }

        let tables =
            SchemaInspector::list_tables_in_schema(self.connection_manager.pool(), schema).await?;
        let count = tables.len();

        info!(schema = %schema, count = count, "Listed tables in schema");

        Ok(ListTablesInSchemaOutput {
            schema: schema.to_string(),
            tables,
            count,
        })
    }

    /// Get column names and data types for one table.
    ///
    /// A malformed identifier is a Validation error; an absent table is not
    /// an error and yields an empty column list.
    pub async fn get_table_schema(
        &self,
        input: GetTableSchemaInput,
    ) -> DbResult<GetTableSchemaOutput> {
        let table = QualifiedTable::parse(&input.table)?;

        let columns =
            SchemaInspector::table_columns(self.connection_manager.pool(), &table).await?;
        let count = columns.len();

        info!(table = %table, count = count, "Fetched table schema");

        Ok(GetTableSchemaOutput {
            table: table.to_string(),
            columns,
            count,
        })
    }
}
