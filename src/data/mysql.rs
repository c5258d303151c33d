//! MySQL storage adapter on a sqlx connection pool.
//!
//! # Responsibilities
//! - Own the connection pool (sizing and acquire timeout come from config)
//! - Bind JSON parameters positionally
//! - Convert result rows to JSON objects keyed by column name
//! - Classify driver errors into [`DataAccessError`] kinds

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Number, Value};
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::types::chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::types::Json;
use sqlx::{Column, Row as _, TypeInfo};

use crate::config::DatabaseConfig;
use crate::data::{DataAccess, DataAccessError, Row};

/// [`DataAccess`] backed by a MySQL pool.
#[derive(Debug, Clone)]
pub struct MySqlDataAccess {
    pool: MySqlPool,
}

impl MySqlDataAccess {
    /// Build the pool without connecting; connections open on first use.
    ///
    /// Only a malformed URL fails here. An unreachable server surfaces on
    /// the first query instead.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DataAccessError> {
        let pool = pool_options(config).connect_lazy(&config.url)?;
        tracing::info!(
            max_connections = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout_secs,
            "Database pool created"
        );
        Ok(Self { pool })
    }
}

fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

#[async_trait]
impl DataAccess for MySqlDataAccess {
    async fn query(&self, text: &str, params: &[Value]) -> Result<Vec<Row>, DataAccessError> {
        let rows = bind_all(sqlx::query(text), params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn execute(&self, text: &str, params: &[Value]) -> Result<u64, DataAccessError> {
        let result = bind_all(sqlx::query(text), params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[Value],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.bind(i)
                } else if let Some(u) = n.as_u64() {
                    query.bind(u)
                } else {
                    query.bind(n.as_f64())
                }
            }
            Value::String(s) => query.bind(s.clone()),
            other => query.bind(Json(other.clone())),
        };
    }
    query
}

fn row_to_json(row: &MySqlRow) -> Result<Row, DataAccessError> {
    let mut out = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let type_name = column.type_info().name();
        let value = match type_name {
            "BOOLEAN" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool),
            "FLOAT" | "DOUBLE" => row
                .try_get::<Option<f64>, _>(index)?
                .and_then(Number::from_f64)
                .map(Value::Number),
            "JSON" => row.try_get::<Option<Json<Value>>, _>(index)?.map(|j| j.0),
            "DATETIME" | "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(index)?
                .map(|t| Value::String(t.to_string())),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(index)?
                .map(|d| Value::String(d.to_string())),
            "TIME" => row
                .try_get::<Option<NaiveTime>, _>(index)?
                .map(|t| Value::String(t.to_string())),
            name if is_integer(name) && name.ends_with("UNSIGNED") => {
                row.try_get::<Option<u64>, _>(index)?.map(Value::from)
            }
            name if is_integer(name) => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
            _ => row
                .try_get_unchecked::<Option<String>, _>(index)?
                .map(Value::String),
        };
        out.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }
    Ok(out)
}

fn is_integer(type_name: &str) -> bool {
    ["TINYINT", "SMALLINT", "MEDIUMINT", "INT", "BIGINT", "YEAR"]
        .iter()
        .any(|prefix| type_name.split(' ').next() == Some(*prefix))
}

/// The pool keeps retrying refused connects until the acquire timeout, so an
/// unreachable server is reported as [`DataAccessError::Timeout`].
impl From<sqlx::Error> for DataAccessError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                DataAccessError::Constraint(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut => DataAccessError::Timeout,
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => DataAccessError::Connection(err.to_string()),
            _ => DataAccessError::Driver(err.to_string()),
        }
    }
}
