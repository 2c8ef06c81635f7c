//! Read-only query execution.
//!
//! Supports bound positional parameters, an optional row limit (enforced by
//! streaming, so at most limit + 1 rows ever leave the database), and a
//! per-call timeout. Every statement runs inside a transaction pinned to
//! READ COMMITTED isolation and READ ONLY mode, so a statement that slips
//! past the syntactic guard still cannot mutate data.

use crate::db::readonly;
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{
    DEFAULT_QUERY_TIMEOUT_SECS, MAX_QUERY_TIMEOUT_SECS, QueryParam, QueryRequest, QueryResult,
};
use futures_util::{Stream, StreamExt};
use sqlx::PgPool;
use sqlx::postgres::{PgArguments, PgRow};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Query executor that handles read-only query execution.
#[derive(Clone)]
pub struct QueryExecutor {
    default_timeout: Duration,
}

impl QueryExecutor {
    pub fn new() -> Self {
        Self {
            default_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS as u64),
        }
    }

    /// An executor whose default timeout comes from configuration, capped at
    /// the per-request maximum.
    pub fn with_default_timeout(timeout_secs: u64) -> Self {
        Self {
            default_timeout: Duration::from_secs(timeout_secs.min(MAX_QUERY_TIMEOUT_SECS as u64)),
        }
    }

    /// Execute a read-only statement and return its rows.
    ///
    /// Fails with a Validation error before any database call when the
    /// statement is not read-only. Database failures surface as Query errors
    /// with the driver message; there are no retries.
    pub async fn execute(&self, pool: &PgPool, request: &QueryRequest) -> DbResult<QueryResult> {
        readonly::validate_read_only(&request.sql)?;

        let start = Instant::now();
        let row_limit = request.effective_limit();
        let query_timeout = request.timeout_override().unwrap_or(self.default_timeout);

        debug!(
            sql = %request.sql,
            param_types = ?request.params.iter().map(|p| p.type_name()).collect::<Vec<_>>(),
            limit = ?row_limit,
            timeout_secs = query_timeout.as_secs(),
            "Executing query"
        );

        let rows = match timeout(
            query_timeout,
            run_read_only(pool, &request.sql, &request.params, row_limit),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(DbError::query(
                    format!("Query timed out after {}s", query_timeout.as_secs()),
                    None,
                    "Narrow the query or raise timeout_secs",
                ));
            }
        };

        process_rows(rows, row_limit, start)
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a statement inside a READ ONLY / READ COMMITTED transaction.
async fn run_read_only(
    pool: &PgPool,
    sql: &str,
    params: &[QueryParam],
    row_limit: Option<u32>,
) -> DbResult<Vec<PgRow>> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
        .execute(&mut *tx)
        .await?;
    sqlx::query("SET TRANSACTION READ ONLY")
        .execute(&mut *tx)
        .await?;

    // When params is empty, run the raw SQL through the simple protocol so
    // statements that cannot be prepared (some SHOW forms) still work.
    let results: Vec<Result<PgRow, sqlx::Error>> = if params.is_empty() {
        use sqlx::Executor;
        let stream = (&mut *tx).fetch(sql);
        collect_limited(stream, row_limit).await
    } else {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param);
        }
        let stream = query.fetch(&mut *tx);
        collect_limited(stream, row_limit).await
    };

    let rows = collect_rows(results)?;
    tx.commit().await?;
    Ok(rows)
}

/// Drain a row stream, fetching at most limit + 1 rows when a limit is set
/// (the extra row marks truncation).
async fn collect_limited<S>(stream: S, row_limit: Option<u32>) -> Vec<Result<PgRow, sqlx::Error>>
where
    S: Stream<Item = Result<PgRow, sqlx::Error>>,
{
    match row_limit {
        Some(limit) => stream.take(limit as usize + 1).collect().await,
        None => stream.collect().await,
    }
}

fn collect_rows(results: Vec<Result<PgRow, sqlx::Error>>) -> DbResult<Vec<PgRow>> {
    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result.map_err(DbError::from)?);
    }
    Ok(rows)
}

fn bind_param<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match param {
        QueryParam::Null => query.bind(None::<String>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
    }
}

/// Convert fetched rows into a QueryResult.
fn process_rows(rows: Vec<PgRow>, row_limit: Option<u32>, start: Instant) -> DbResult<QueryResult> {
    let execution_time_ms = start.elapsed().as_millis() as u64;

    if rows.is_empty() {
        return Ok(QueryResult::empty(execution_time_ms));
    }

    let columns = rows[0].get_column_metadata();
    let total_rows = rows.len();
    let truncated = row_limit.is_some_and(|limit| total_rows > limit as usize);
    let rows_to_take = row_limit
        .map(|limit| (limit as usize).min(total_rows))
        .unwrap_or(total_rows);

    let json_rows: Vec<serde_json::Map<String, serde_json::Value>> = rows
        .iter()
        .take(rows_to_take)
        .map(|r| r.to_json_map())
        .collect();

    if truncated {
        warn!(
            total_rows = total_rows,
            limit = ?row_limit,
            "Query result truncated"
        );
    }

    Ok(QueryResult {
        columns,
        rows: json_rows,
        truncated,
        execution_time_ms,
    })
}
