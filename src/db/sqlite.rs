//! SQLite store implementation.
//!
//! Provides the `SqliteStore` struct that implements the `Store` trait for a
//! SQLite database file using sqlx. Every call opens its own read-only,
//! immutable connection and closes it before returning.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};
use tracing::{debug, warn};

use crate::db::{ResultRow, Store, Value};
use crate::error::{AskError, Result};
use crate::safety::AcceptedStatement;

/// Read-only SQLite store backed by a database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Creates a store for the database file at `path`.
    ///
    /// The file is not touched until the first execution.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh read-only handle on the database file.
    async fn open(&self) -> Result<SqliteConnection> {
        if !self.path.is_file() {
            return Err(AskError::store_unavailable(format!(
                "Database file not found: {}",
                self.path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true)
            .immutable(true)
            .create_if_missing(false);

        SqliteConnection::connect_with(&options).await.map_err(|e| {
            AskError::store_unavailable(format!(
                "Failed to open database {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn execute(&self, statement: &AcceptedStatement) -> Result<Vec<ResultRow>> {
        let sql = statement.sql();
        ensure_single_statement(sql)?;

        let mut conn = self.open().await?;
        let start = Instant::now();
        let result = sqlx::query(sql).fetch_all(&mut conn).await;

        // The handle is released before the outcome is inspected.
        if let Err(e) = conn.close().await {
            warn!("Failed to close store handle: {e}");
        }

        let rows = result.map_err(|e| AskError::execution(format_query_error(e)))?;
        debug!(
            row_count = rows.len(),
            elapsed = ?start.elapsed(),
            "Statement executed"
        );

        rows.iter().map(convert_row).collect()
    }
}

/// Refuses text holding more than one statement.
///
/// Text the parser cannot read is tokenized instead, and refused if anything
/// other than whitespace or comments follows a semicolon.
fn ensure_single_statement(sql: &str) -> Result<()> {
    let dialect = SQLiteDialect {};
    match Parser::parse_sql(&dialect, sql) {
        Ok(statements) if statements.len() > 1 => Err(multiple_statements()),
        Ok(_) => Ok(()),
        Err(e) => {
            debug!("Statement not parsed, counting statements by token: {e}");
            let tokens = Tokenizer::new(&dialect, sql).tokenize().map_err(|e| {
                AskError::execution(format!("Statement could not be tokenized: {e}"))
            })?;
            if has_statement_after_semicolon(&tokens) {
                return Err(multiple_statements());
            }
            Ok(())
        }
    }
}

fn has_statement_after_semicolon(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .skip_while(|token| !matches!(token, Token::SemiColon))
        .any(|token| !matches!(token, Token::SemiColon | Token::Whitespace(_) | Token::EOF))
}

fn multiple_statements() -> AskError {
    AskError::execution("multiple statements are not allowed")
}

/// Converts a sqlx SqliteRow to our ResultRow type.
fn convert_row(row: &SqliteRow) -> Result<ResultRow> {
    let mut result = ResultRow::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        result.insert(column.name(), convert_value(row, index)?);
    }
    Ok(result)
}

/// Converts a single value by its runtime storage class.
///
/// SQLite columns are loosely typed, so the declared column type is ignored.
/// A value that cannot be decoded (e.g. TEXT holding invalid UTF-8) fails the
/// whole result.
fn convert_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index).map_err(|e| decode_error(row, index, e))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_uppercase();

    let value = match type_name.as_str() {
        "INTEGER" => row.try_get::<i64, _>(index).map(Value::Int),
        "REAL" => row.try_get::<f64, _>(index).map(Value::Float),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(Value::Bytes),
        // TEXT and anything else
        _ => row.try_get::<String, _>(index).map(Value::String),
    };

    value.map_err(|e| decode_error(row, index, e))
}

fn decode_error(row: &SqliteRow, index: usize, error: sqlx::Error) -> AskError {
    let column = row.columns().get(index).map(|c| c.name()).unwrap_or("?");
    warn!(column, "Failed to decode value: {error}");
    AskError::execution(format!("Failed to decode column {column}: {error}"))
}

/// Extracts the store's own message from a query error.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}
