//! Integration tests for read-only statement validation.
//!
//! These tests verify that the query path rejects write operations and
//! allows read-only statements.

use steampipe_mcp_server::db::readonly::{READ_ONLY_KEYWORDS, validate_read_only};
use steampipe_mcp_server::error::DbError;

/// Test that INSERT is rejected with a Validation error.
#[test]
fn test_query_rejects_insert() {
    let result = validate_read_only("INSERT INTO users (name) VALUES ('test')");
    assert!(result.is_err(), "INSERT should be rejected");

    let err = result.unwrap_err();
    assert!(
        matches!(err, DbError::Validation { .. }),
        "Should be Validation error, got: {:?}",
        err
    );
}

/// Test that UPDATE is rejected with a Validation error.
#[test]
fn test_query_rejects_update() {
    let result = validate_read_only("UPDATE users SET name = 'changed' WHERE id = 1");
    assert!(result.is_err(), "UPDATE should be rejected");

    let err = result.unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));
}

/// Test that DELETE is rejected with a Validation error.
#[test]
fn test_query_rejects_delete() {
    let result = validate_read_only("DELETE FROM users WHERE id = 1");
    assert!(result.is_err(), "DELETE should be rejected");

    let err = result.unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));
}

/// Test that CREATE TABLE is rejected.
#[test]
fn test_query_rejects_create() {
    assert!(validate_read_only("CREATE TABLE test (id INT PRIMARY KEY)").is_err());
}

/// Test that DROP TABLE is rejected.
#[test]
fn test_query_rejects_drop() {
    assert!(validate_read_only("DROP TABLE users").is_err());
}

/// Test that TRUNCATE is rejected.
#[test]
fn test_query_rejects_truncate() {
    assert!(validate_read_only("TRUNCATE users").is_err());
}

/// Test that GRANT is rejected.
#[test]
fn test_query_rejects_grant() {
    assert!(validate_read_only("GRANT ALL ON users TO intruder").is_err());
}

/// Test that transaction control statements are rejected.
#[test]
fn test_query_rejects_transaction_control() {
    assert!(validate_read_only("BEGIN").is_err());
    assert!(validate_read_only("COMMIT").is_err());
    assert!(validate_read_only("ROLLBACK").is_err());
}

/// Test that COPY is rejected.
#[test]
fn test_query_rejects_copy() {
    assert!(validate_read_only("COPY users TO '/tmp/out.csv'").is_err());
}

/// Test that SELECT is allowed.
#[test]
fn test_query_allows_select() {
    assert!(validate_read_only("SELECT * FROM users WHERE id = 1").is_ok());
}

/// Test that SELECT with complex joins is allowed.
#[test]
fn test_query_allows_complex_select() {
    let sql = r#"
        SELECT u.name, o.total
        FROM users u
        JOIN orders o ON u.id = o.user_id
        WHERE o.created_at > '2024-01-01'
        ORDER BY o.total DESC
    "#;
    assert!(validate_read_only(sql).is_ok());
}

/// Test that a CTE query is allowed.
#[test]
fn test_query_allows_with() {
    let sql = "WITH active AS (SELECT id FROM users WHERE active) SELECT count(*) FROM active";
    assert!(validate_read_only(sql).is_ok());
}

/// Test that EXPLAIN and SHOW are allowed.
#[test]
fn test_query_allows_explain_and_show() {
    assert!(validate_read_only("EXPLAIN SELECT 1").is_ok());
    assert!(validate_read_only("EXPLAIN ANALYZE SELECT * FROM t").is_ok());
    assert!(validate_read_only("SHOW search_path").is_ok());
}

/// Test that keyword matching ignores case and leading whitespace.
#[test]
fn test_query_keyword_normalization() {
    assert!(validate_read_only("  select 1").is_ok());
    assert!(validate_read_only("\n\tSELECT 1").is_ok());
    assert!(validate_read_only("  insert into t values (1)").is_err());
}

/// Test that leading comments do not hide the real statement.
#[test]
fn test_query_leading_comments() {
    assert!(validate_read_only("-- comment\nSELECT 1").is_ok());
    assert!(validate_read_only("/* comment */ SELECT 1").is_ok());
    assert!(validate_read_only("-- comment\nDELETE FROM t").is_err());
    assert!(validate_read_only("/* comment */ DROP TABLE t").is_err());
}

/// Test that chained statements are rejected even when both are read-only.
#[test]
fn test_query_rejects_chained_statements() {
    assert!(validate_read_only("SELECT 1; SELECT 2").is_err());
    assert!(validate_read_only("SELECT 1; DROP TABLE users").is_err());
}

/// Test that a trailing semicolon is not treated as chaining.
#[test]
fn test_query_allows_trailing_semicolon() {
    assert!(validate_read_only("SELECT 1;").is_ok());
    assert!(validate_read_only("SELECT 1;   ").is_ok());
}

/// Test that semicolons inside literals do not trigger the chaining check.
#[test]
fn test_query_semicolons_in_literals() {
    assert!(validate_read_only("SELECT 'a; b; c'").is_ok());
    assert!(validate_read_only(r#"SELECT "col;umn" FROM t"#).is_ok());
}

/// Test that empty input is rejected.
#[test]
fn test_query_rejects_empty() {
    assert!(validate_read_only("").is_err());
    assert!(validate_read_only("   \n  ").is_err());
    assert!(validate_read_only("-- only a comment").is_err());
}

/// The keyword set is exactly the documented read-only set.
#[test]
fn test_keyword_set() {
    assert_eq!(READ_ONLY_KEYWORDS, &["SELECT", "WITH", "EXPLAIN", "SHOW"]);
}
