//! Tool handlers behind the MCP dispatcher: `query`, `list_all_tables`,
//! `list_tables_in_schema`, and `get_table_schema`.

pub mod query;
pub mod schema;

pub use query::{QueryInput, QueryOutput, QueryToolHandler};
pub use schema::{
    GetTableSchemaInput, GetTableSchemaOutput, ListAllTablesOutput, ListTablesInSchemaInput,
    ListTablesInSchemaOutput, SchemaToolHandler,
};
