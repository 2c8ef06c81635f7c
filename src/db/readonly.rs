//! Read-only statement validation for the `query` tool.
//!
//! The guard is syntactic: it checks that the leading keyword of the
//! statement (after skipping whitespace and SQL comments) is one of the
//! read-only set, and that no second statement is chained behind a
//! semicolon. It does not parse SQL and does not try to detect read-only
//! looking statements that call mutating functions; the read-only
//! transaction wrapping in the executor covers those server-side.

use crate::error::{DbError, DbResult};

/// Leading keywords accepted by the `query` tool.
pub const READ_ONLY_KEYWORDS: &[&str] = &["SELECT", "WITH", "EXPLAIN", "SHOW"];

/// Validate that a statement is read-only and unchained.
///
/// Returns `Ok(())` for a single SELECT/WITH/EXPLAIN/SHOW statement, or a
/// Validation error otherwise. No database call is made here.
pub fn validate_read_only(sql: &str) -> DbResult<()> {
    let body = skip_comments_and_whitespace(sql);

    let keyword = leading_keyword(body).ok_or_else(|| {
        DbError::validation("Statement is empty or does not start with a SQL keyword")
    })?;

    if !READ_ONLY_KEYWORDS
        .iter()
        .any(|k| keyword.eq_ignore_ascii_case(k))
    {
        return Err(DbError::validation(format!(
            "Statement '{}' is not allowed. Only read-only statements (SELECT, WITH, EXPLAIN, SHOW) can be executed.",
            keyword.to_ascii_uppercase()
        )));
    }

    if has_chained_statement(body) {
        return Err(DbError::validation(
            "Multiple statements are not allowed. Submit a single read-only statement.",
        ));
    }

    Ok(())
}

/// Skip leading whitespace, `--` line comments, and `/* */` block comments.
fn skip_comments_and_whitespace(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("--") {
            rest = match after.find('\n') {
                Some(idx) => &after[idx + 1..],
                None => "",
            };
        } else if let Some(after) = trimmed.strip_prefix("/*") {
            rest = match after.find("*/") {
                Some(idx) => &after[idx + 2..],
                // Unterminated comment; nothing executable follows
                None => "",
            };
        } else {
            return trimmed;
        }
    }
}

/// Extract the first word of the statement body.
fn leading_keyword(body: &str) -> Option<&str> {
    let end = body
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(body.len());
    let word = &body[..end];
    if word.is_empty() || !word.chars().next()?.is_ascii_alphabetic() {
        return None;
    }
    Some(word)
}

/// Detect a semicolon followed by further statement text.
///
/// Quoted strings ('...' with '' escapes), quoted identifiers ("..."), and
/// comments are skipped so that semicolons inside them do not count. A
/// trailing semicolon with nothing but whitespace or comments after it is
/// accepted.
fn has_chained_statement(body: &str) -> bool {
    let bytes = body.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                // String literal; '' is an escaped quote
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == b'\'' {
                        if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'"' => {
                // Quoted identifier
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                i += 1;
            }
            b'-' if i + 1 < bytes.len() && bytes[i + 1] == b'-' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 2;
            }
            b';' => {
                let remainder = skip_comments_and_whitespace(&body[i + 1..]);
                return !remainder.is_empty();
            }
            _ => i += 1,
        }
    }

    false
}
