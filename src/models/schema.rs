//! Table and column descriptors, and the "schema.table" identifier parser.

use crate::error::{DbError, DbResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A (schema, table) pair as returned by table listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableRef {
    /// Schema the table belongs to
    pub schema: String,
    /// Table name
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Dotted "schema.table" form.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

/// A column name and its data type, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    /// Column name
    pub column: String,
    /// Data type as reported by information_schema (e.g., "integer", "text")
    #[serde(rename = "type")]
    pub data_type: String,
}

impl ColumnInfo {
    pub fn new(column: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            data_type: data_type.into(),
        }
    }
}

/// A parsed "schema.table" identifier.
///
/// The input is split at the first dot only, so a table name may itself
/// contain dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedTable {
    pub schema: String,
    pub table: String,
}

impl QualifiedTable {
    /// Parse a qualified table identifier.
    ///
    /// Fails with a Validation error when the separator is missing or either
    /// component is empty.
    pub fn parse(input: &str) -> DbResult<Self> {
        let malformed = || {
            DbError::validation(format!(
                "Invalid table name format: '{}'. Expected 'schema.table'.",
                input
            ))
        };

        let (schema, table) = input.split_once('.').ok_or_else(malformed)?;
        if schema.is_empty() || table.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }
}

impl std::fmt::Display for QualifiedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified_table() {
        let parsed = QualifiedTable::parse("public.users").unwrap();
        assert_eq!(parsed.schema, "public");
        assert_eq!(parsed.table, "users");
    }

    #[test]
    fn test_parse_splits_at_first_dot_only() {
        let parsed = QualifiedTable::parse("aws.ec2.instance").unwrap();
        assert_eq!(parsed.schema, "aws");
        assert_eq!(parsed.table, "ec2.instance");
    }

    #[test]
    fn test_parse_missing_separator() {
        let err = QualifiedTable::parse("users").unwrap_err();
        assert!(matches!(err, DbError::Validation { .. }));
        assert!(err.to_string().contains("schema.table"));
    }

    #[test]
    fn test_parse_empty_components() {
        assert!(QualifiedTable::parse(".users").is_err());
        assert!(QualifiedTable::parse("public.").is_err());
        assert!(QualifiedTable::parse(".").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let parsed = QualifiedTable::parse("public.users").unwrap();
        assert_eq!(parsed.to_string(), "public.users");
    }

    #[test]
    fn test_table_ref_serialization() {
        let t = TableRef::new("public", "users");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"schema":"public","table":"users"}"#);
    }

    #[test]
    fn test_column_info_serializes_type_field() {
        let c = ColumnInfo::new("id", "integer");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"column":"id","type":"integer"}"#);
    }
}
