//! In-memory storage adapter.
//!
//! Returns scripted rows, records every statement it receives and can be told
//! to fail. Used by tests and by local runs without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::data::{DataAccess, DataAccessError, Row};

/// A statement received by [`MemoryDataAccess`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query { text: String, params: Vec<Value> },
    Execute { text: String, params: Vec<Value> },
}

#[derive(Debug, Default)]
struct State {
    rows: Vec<Row>,
    affected: u64,
    failure: Option<DataAccessError>,
    calls: Vec<Call>,
}

/// Scripted, recording [`DataAccess`] implementation.
#[derive(Debug, Default)]
pub struct MemoryDataAccess {
    state: Mutex<State>,
}

impl MemoryDataAccess {
    /// An adapter that returns no rows and reports one affected row per write.
    pub fn new() -> Self {
        Self::default().with_affected(1)
    }

    /// Rows returned by every query, in this order.
    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.lock().rows = rows;
        self
    }

    pub fn with_affected(self, affected: u64) -> Self {
        self.lock().affected = affected;
        self
    }

    /// Make every subsequent call fail with `error`.
    pub fn failing_with(self, error: DataAccessError) -> Self {
        self.lock().failure = Some(error);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Only the writes received so far.
    pub fn executions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Execute { .. }))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("memory data access mutex poisoned")
    }
}

#[async_trait]
impl DataAccess for MemoryDataAccess {
    async fn query(&self, text: &str, params: &[Value]) -> Result<Vec<Row>, DataAccessError> {
        let mut state = self.lock();
        state.calls.push(Call::Query {
            text: text.to_string(),
            params: params.to_vec(),
        });
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.rows.clone()),
        }
    }

    async fn execute(&self, text: &str, params: &[Value]) -> Result<u64, DataAccessError> {
        let mut state = self.lock();
        state.calls.push(Call::Execute {
            text: text.to_string(),
            params: params.to_vec(),
        });
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.affected),
        }
    }
}
