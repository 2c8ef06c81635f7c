//! The `query` tool: arbitrary read-only SQL in, JSON rows out.

use crate::db::{ConnectionManager, QueryExecutor};
use crate::error::DbResult;
use crate::models::{ColumnMetadata, QueryParam, QueryRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

/// Arguments accepted by the `query` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryInput {
    /// SQL statement to run. Must start with SELECT, WITH, EXPLAIN, or SHOW;
    /// anything else is rejected before reaching the database.
    pub sql: String,
    /// Values for $1, $2, ... placeholders. Plain JSON scalars.
    #[serde(default)]
    pub params: Vec<QueryParamInput>,
    /// Cap on returned rows (max 10000). Omit for no cap.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Timeout override in seconds (default 30, max 300).
    #[serde(default)]
    pub timeout_secs: Option<u32>,
}

/// Wire form of a bound parameter. Mirrors `QueryParam` so the tool schema
/// documents the accepted scalar types.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum QueryParamInput {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<QueryParamInput> for QueryParam {
    fn from(input: QueryParamInput) -> Self {
        match input {
            QueryParamInput::Null => QueryParam::Null,
            QueryParamInput::Bool(v) => QueryParam::Bool(v),
            QueryParamInput::Int(v) => QueryParam::Int(v),
            QueryParamInput::Float(v) => QueryParam::Float(v),
            QueryParamInput::String(v) => QueryParam::String(v),
        }
    }
}

/// Result payload for the `query` tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct QueryOutput {
    /// Name and database type of each result column
    pub columns: Vec<ColumnMetadata>,
    /// Rows as column-name to value maps
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    pub row_count: usize,
    /// True when `limit` cut the result short
    pub truncated: bool,
    pub execution_time_ms: u64,
}

#[derive(Clone)]
pub struct QueryToolHandler {
    connection_manager: Arc<ConnectionManager>,
    executor: QueryExecutor,
}

impl QueryToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self::with_executor(connection_manager, QueryExecutor::new())
    }

    pub fn with_executor(
        connection_manager: Arc<ConnectionManager>,
        executor: QueryExecutor,
    ) -> Self {
        Self {
            connection_manager,
            executor,
        }
    }

    /// Run one read-only statement and shape the result for the client.
    pub async fn query(&self, input: QueryInput) -> DbResult<QueryOutput> {
        let request = QueryRequest {
            sql: input.sql,
            params: input.params.into_iter().map(Into::into).collect(),
            limit: input.limit,
            timeout_secs: input.timeout_secs,
        };

        let result = self
            .executor
            .execute(self.connection_manager.pool(), &request)
            .await?;

        info!(
            row_count = result.rows.len(),
            truncated = result.truncated,
            execution_time_ms = result.execution_time_ms,
            "Query executed"
        );

        Ok(QueryOutput {
            columns: result.columns,
            row_count: result.rows.len(),
            rows: result.rows,
            truncated: result.truncated,
            execution_time_ms: result.execution_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_with_params_and_limit() {
        let input: QueryInput = serde_json::from_str(
            r#"{"sql": "SELECT * FROM users WHERE id = $1", "params": [42], "limit": 100}"#,
        )
        .unwrap();
        assert_eq!(input.sql, "SELECT * FROM users WHERE id = $1");
        assert_eq!(input.params.len(), 1);
        assert!(matches!(input.params[0], QueryParamInput::Int(42)));
        assert_eq!(input.limit, Some(100));
    }

    #[test]
    fn bare_sql_is_enough() {
        let input: QueryInput = serde_json::from_str(r#"{"sql": "SELECT 1"}"#).unwrap();
        assert!(input.params.is_empty());
        assert_eq!(input.limit, None);
        assert_eq!(input.timeout_secs, None);
    }

    #[test]
    fn wire_params_convert_losslessly() {
        let inputs: Vec<QueryParamInput> =
            serde_json::from_str(r#"[null, false, 7, 2.5, "x"]"#).unwrap();
        let params: Vec<QueryParam> = inputs.into_iter().map(Into::into).collect();
        assert!(matches!(params[0], QueryParam::Null));
        assert!(matches!(params[1], QueryParam::Bool(false)));
        assert!(matches!(params[2], QueryParam::Int(7)));
        assert!(matches!(params[3], QueryParam::Float(_)));
        assert!(matches!(params[4], QueryParam::String(_)));
    }

    #[test]
    fn output_serializes_rows_and_counters() {
        let mut row = serde_json::Map::new();
        row.insert("id".to_string(), JsonValue::from(1));

        let output = QueryOutput {
            columns: vec![ColumnMetadata::new("id", "INT4")],
            rows: vec![row],
            row_count: 1,
            truncated: false,
            execution_time_ms: 10,
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["row_count"], 1);
        assert_eq!(json["truncated"], false);
        assert_eq!(json["rows"][0]["id"], 1);
        assert_eq!(json["columns"][0]["name"], "id");
    }
}
