use serde_json::Value;
use sqlx::{postgres::PgArguments, postgres::PgRow, FromRow, PgPool};

use crate::config;
use crate::database::manager::DatabaseError;
use crate::filter::SqlResult;

/// Run a built statement and map every row.
pub async fn fetch_all_as<T>(pool: &PgPool, sql: &SqlResult) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    log_query(sql);
    let mut q = sqlx::query_as::<_, T>(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_all(pool).await?)
}

/// Run a built statement expecting zero or one row.
pub async fn fetch_optional_as<T>(pool: &PgPool, sql: &SqlResult) -> Result<Option<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    log_query(sql);
    let mut q = sqlx::query_as::<_, T>(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query_as(q, p);
    }
    Ok(q.fetch_optional(pool).await?)
}

fn log_query(sql: &SqlResult) {
    if config::config().database.enable_query_logging {
        tracing::debug!(query = %sql.query, params = ?sql.params, "executing");
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        // An int4 NULL is assignment-compatible with the integer, numeric and text columns
        Value::Null => q.bind(None::<i32>),
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}
