//! Request and result types for the `query` tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Hard cap on the per-request row limit.
pub const MAX_ROW_LIMIT: u32 = 10000;

/// Timeout applied when a request does not carry its own.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 30;

/// Hard cap on the per-request timeout.
pub const MAX_QUERY_TIMEOUT_SECS: u32 = 300;

/// A bound parameter value. Untagged so callers pass plain JSON scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    Null,
    Bool(bool),
    /// i64 covers every PostgreSQL integer width
    Int(i64),
    Float(f64),
    String(String),
}

impl QueryParam {
    /// Name of the carried type, for trace output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

/// One statement plus its execution options. Built per call, dropped after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
    #[serde(default)]
    pub params: Vec<QueryParam>,
    /// Row cap; absent means return everything
    #[serde(default)]
    pub limit: Option<u32>,
    /// Per-request timeout override in seconds
    #[serde(default)]
    pub timeout_secs: Option<u32>,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            limit: None,
            timeout_secs: None,
        }
    }

    pub fn with_param(mut self, param: QueryParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// The row limit clamped into [1, MAX_ROW_LIMIT], or None for unlimited.
    pub fn effective_limit(&self) -> Option<u32> {
        self.limit.map(|l| l.clamp(1, MAX_ROW_LIMIT))
    }

    /// The caller's timeout override capped at the maximum, when present.
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout_secs
            .map(|t| Duration::from_secs(t.min(MAX_QUERY_TIMEOUT_SECS) as u64))
    }
}

/// Name and database type of one result column.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnMetadata {
    pub name: String,
    /// Type name as the driver reports it, e.g. "INT8", "TIMESTAMPTZ"
    pub type_name: String,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Rows plus metadata for one executed statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    /// Set when the requested limit cut the result short
    pub truncated: bool,
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn empty(execution_time_ms: u64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            truncated: false,
            execution_time_ms,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_type_names() {
        assert_eq!(QueryParam::Null.type_name(), "null");
        assert_eq!(QueryParam::Int(42).type_name(), "int");
        assert_eq!(QueryParam::String("x".into()).type_name(), "string");
    }

    #[test]
    fn request_without_options_has_no_limit_or_override() {
        let req = QueryRequest::new("SELECT 1");
        assert_eq!(req.effective_limit(), None);
        assert_eq!(req.timeout_override(), None);
    }

    #[test]
    fn limit_and_timeout_are_clamped() {
        let req = QueryRequest::new("SELECT 1").with_limit(99999).with_timeout(999);
        assert_eq!(req.effective_limit(), Some(MAX_ROW_LIMIT));
        assert_eq!(
            req.timeout_override(),
            Some(Duration::from_secs(MAX_QUERY_TIMEOUT_SECS as u64))
        );
    }

    #[test]
    fn zero_limit_rounds_up_to_one() {
        let req = QueryRequest::new("SELECT 1").with_limit(0);
        assert_eq!(req.effective_limit(), Some(1));
    }

    #[test]
    fn params_deserialize_from_plain_json_scalars() {
        let params: Vec<QueryParam> =
            serde_json::from_str(r#"[null, true, 1, 2.5, "text"]"#).unwrap();
        assert_eq!(params.len(), 5);
        assert!(matches!(params[0], QueryParam::Null));
        assert!(matches!(params[2], QueryParam::Int(1)));
        assert!(matches!(params[4], QueryParam::String(_)));
    }

    #[test]
    fn empty_result_shape() {
        let result = QueryResult::empty(7);
        assert!(result.is_empty());
        assert_eq!(result.row_count(), 0);
        assert!(!result.truncated);
        assert_eq!(result.execution_time_ms, 7);
    }
}
