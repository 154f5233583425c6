//! Tabular store layer for askcars.
//!
//! Provides a trait-based interface for running gate-certified statements,
//! so the SQLite store and test doubles can be used interchangeably.

mod mock;
mod sqlite;
mod types;

pub use mock::{FailingStore, RecordingStore};
pub use sqlite::SqliteStore;
pub use types::{ResultRow, Value};

use crate::error::Result;
use crate::safety::AcceptedStatement;
use async_trait::async_trait;

/// Trait defining the interface for tabular stores.
///
/// Implementations open a fresh handle per call and release it before
/// returning, on success and on failure.
#[async_trait]
pub trait Store: Send + Sync {
    /// Runs exactly one accepted statement and returns its rows in store order.
    ///
    /// Fails with `StoreUnavailable` when the store cannot be opened and with
    /// `Execution` when the store rejects the statement.
    async fn execute(&self, statement: &AcceptedStatement) -> Result<Vec<ResultRow>>;
}

#[async_trait]
impl<T: Store + ?Sized> Store for std::sync::Arc<T> {
    async fn execute(&self, statement: &AcceptedStatement) -> Result<Vec<ResultRow>> {
        (**self).execute(statement).await
    }
}
