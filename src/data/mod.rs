//! Storage access subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → DataAccess::query / DataAccess::execute (async, may suspend)
//!     → mysql.rs (sqlx pool, owned and synchronised by the adapter)
//!       or memory.rs (scripted rows, recorded calls)
//!     → rows as JSON objects / affected-row count
//! ```
//!
//! # Design Decisions
//! - The routing core only sees the trait; adapters are injected
//! - No retry or backoff here; policy belongs to a specific adapter
//! - Parameters are positional JSON values bound in order

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// One result row, keyed by column name.
pub type Row = Map<String, Value>;

/// Failure reported by a storage adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataAccessError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("timed out waiting for a database connection")]
    Timeout,

    #[error("database driver error: {0}")]
    Driver(String),
}

impl DataAccessError {
    /// Short machine-readable kind, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DataAccessError::Connection(_) => "connection",
            DataAccessError::Constraint(_) => "constraint",
            DataAccessError::Timeout => "timeout",
            DataAccessError::Driver(_) => "driver",
        }
    }
}

/// Read/write capability against the relational store.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Run a statement that returns rows.
    async fn query(&self, text: &str, params: &[Value]) -> Result<Vec<Row>, DataAccessError>;

    /// Run a write, returning the number of affected rows.
    async fn execute(&self, text: &str, params: &[Value]) -> Result<u64, DataAccessError>;
}
