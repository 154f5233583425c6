//! Store test doubles.
//!
//! Provides in-memory stores for exercising the pipeline without a database file.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ResultRow, Store};
use crate::error::{AskError, Result};
use crate::safety::AcceptedStatement;

/// A store that returns predefined rows and records every statement it runs.
#[derive(Debug, Default)]
pub struct RecordingStore {
    rows: Vec<ResultRow>,
    calls: Mutex<Vec<String>>,
}

impl RecordingStore {
    /// Creates a store that returns no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that returns the given rows for every statement.
    pub fn with_rows(rows: Vec<ResultRow>) -> Self {
        Self {
            rows,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the statements executed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Returns the number of executions.
    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn execute(&self, statement: &AcceptedStatement) -> Result<Vec<ResultRow>> {
        self.calls
            .lock()
            .map_err(|_| AskError::internal("recording store lock poisoned"))?
            .push(statement.sql().to_string());
        Ok(self.rows.clone())
    }
}

/// A store whose every execution fails with a fixed error.
#[derive(Debug, Clone)]
pub struct FailingStore {
    unavailable: bool,
    message: String,
}

impl FailingStore {
    /// Fails every execution as if the store rejected the statement.
    pub fn execution(message: impl Into<String>) -> Self {
        Self {
            unavailable: false,
            message: message.into(),
        }
    }

    /// Fails every execution as if the store could not be opened.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            unavailable: true,
            message: message.into(),
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn execute(&self, _statement: &AcceptedStatement) -> Result<Vec<ResultRow>> {
        if self.unavailable {
            Err(AskError::store_unavailable(self.message.clone()))
        } else {
            Err(AskError::execution(self.message.clone()))
        }
    }
}
