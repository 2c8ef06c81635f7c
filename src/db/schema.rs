//! Catalog introspection.
//!
//! Three fixed, parameterized queries over `information_schema`. Foreign
//! tables are included throughout because Steampipe exposes its plugin data
//! as foreign tables, one schema per data source. Results are transient;
//! nothing here is cached.

use crate::error::{DbError, DbResult};
use crate::models::{ColumnInfo, QualifiedTable, TableRef};
use sqlx::PgPool;
use tracing::debug;

/// Schema inspector for catalog introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// List all tables in all non-system schemas, ordered by schema then
    /// table name.
    pub async fn list_all_tables(pool: &PgPool) -> DbResult<Vec<TableRef>> {
        let rows: Vec<(String, String)> = sqlx::query_as(queries::LIST_ALL_TABLES)
            .fetch_all(pool)
            .await
            .map_err(DbError::from)?;

        debug!(count = rows.len(), "Listed tables across all schemas");

        Ok(rows
            .into_iter()
            .map(|(schema, table)| TableRef::new(schema, table))
            .collect())
    }

    /// List all tables in one schema, ordered by table name. The schema name
    /// is passed as a bound parameter.
    pub async fn list_tables_in_schema(pool: &PgPool, schema: &str) -> DbResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(queries::LIST_TABLES_IN_SCHEMA)
            .bind(schema)
            .fetch_all(pool)
            .await
            .map_err(DbError::from)?;

        debug!(schema = %schema, count = rows.len(), "Listed tables in schema");

        Ok(rows.into_iter().map(|(table,)| table).collect())
    }

    /// List the columns of one table, ordered by ordinal position. Both
    /// identifier components are bound as parameters. A table that does not
    /// exist yields an empty list.
    pub async fn table_columns(pool: &PgPool, table: &QualifiedTable) -> DbResult<Vec<ColumnInfo>> {
        let rows: Vec<(String, String)> = sqlx::query_as(queries::TABLE_COLUMNS)
            .bind(&table.schema)
            .bind(&table.table)
            .fetch_all(pool)
            .await
            .map_err(DbError::from)?;

        debug!(table = %table, count = rows.len(), "Fetched table columns");

        Ok(rows
            .into_iter()
            .map(|(column, data_type)| ColumnInfo::new(column, data_type))
            .collect())
    }
}

// =============================================================================
// Catalog SQL
// =============================================================================

mod queries {
    pub const LIST_ALL_TABLES: &str = r#"
        SELECT t.table_schema, t.table_name
        FROM information_schema.tables t
        WHERE t.table_schema NOT IN ('pg_catalog', 'information_schema')
          AND t.table_type IN ('BASE TABLE', 'FOREIGN')
        ORDER BY t.table_schema, t.table_name
        "#;

    pub const LIST_TABLES_IN_SCHEMA: &str = r#"
        SELECT t.table_name
        FROM information_schema.tables t
        WHERE t.table_schema = $1
          AND t.table_type IN ('BASE TABLE', 'FOREIGN')
        ORDER BY t.table_name
        "#;

    pub const TABLE_COLUMNS: &str = r#"
        SELECT c.column_name, c.data_type
        FROM information_schema.columns c
        WHERE c.table_schema = $1
          AND c.table_name = $2
        ORDER BY c.ordinal_position
        "#;
}
