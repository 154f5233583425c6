//! Pipeline stages and outcomes.
//!
//! A request either reaches `Responded` with a [`QueryAnswer`] or stops in an
//! [`Aborted`] state that records where and why it stopped.

#![warn(missing_docs)]

use std::fmt;

use serde::Serialize;

use crate::db::ResultRow;
use crate::error::AskError;
use crate::safety::{Rejection, RejectionReason};

/// Stages of a request, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// A question or statement arrived.
    Received,
    /// The synthesizer produced candidate SQL.
    Synthesized,
    /// The gate accepted the statement.
    Validated,
    /// The store returned rows.
    Executed,
    /// The answer was built for the caller.
    Responded,
}

impl Stage {
    /// Returns the stage as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Synthesized => "synthesized",
            Self::Validated => "validated",
            Self::Executed => "executed",
            Self::Responded => "responded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortKind {
    /// The question was empty.
    NoQuestion,
    /// The caller-supplied SQL was empty.
    NoSql,
    /// The synthesis backend failed.
    Backend,
    /// The synthesis backend produced no usable text.
    EmptyResponse,
    /// The safety gate refused the statement.
    UnsafeSql(RejectionReason),
    /// The store could not be opened.
    StoreUnavailable,
    /// The store rejected an accepted statement.
    QueryFailed,
}

/// Transport-neutral classification of an abort.
///
/// A boundary layer maps these to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHint {
    /// The caller sent unusable input.
    Client,
    /// The synthesis backend failed.
    Upstream,
    /// The statement was refused by the gate.
    Rejected,
    /// The store could not run the statement.
    Failed,
}

impl StatusHint {
    /// Returns the hint as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Upstream => "upstream",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for StatusHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absorbing failure state of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aborted {
    /// Last stage the request reached before failing.
    pub stage: Stage,
    /// Failure kind.
    pub kind: AbortKind,
    /// Message reported to the caller.
    pub message: String,
    /// SQL text involved in the failure, when there is one.
    pub sql: Option<String>,
}

impl Aborted {
    pub(crate) fn no_question() -> Self {
        Self {
            stage: Stage::Received,
            kind: AbortKind::NoQuestion,
            message: "No question provided".to_string(),
            sql: None,
        }
    }

    pub(crate) fn no_sql() -> Self {
        Self {
            stage: Stage::Received,
            kind: AbortKind::NoSql,
            message: "No SQL provided".to_string(),
            sql: None,
        }
    }

    /// Builds an abort for a gate refusal. `prefix` names who produced the SQL.
    pub(crate) fn rejected(stage: Stage, prefix: &str, rejection: Rejection) -> Self {
        Self {
            stage,
            kind: AbortKind::UnsafeSql(rejection.reason),
            message: format!("{}: {}", prefix, rejection.reason),
            sql: Some(rejection.statement),
        }
    }

    /// Builds an abort from a synthesis or store error.
    pub(crate) fn from_error(stage: Stage, error: AskError, sql: Option<String>) -> Self {
        let kind = match &error {
            AskError::Input(_) => AbortKind::NoQuestion,
            AskError::Backend(_) | AskError::Config(_) => AbortKind::Backend,
            AskError::EmptyResponse(_) => AbortKind::EmptyResponse,
            AskError::StoreUnavailable(_) => AbortKind::StoreUnavailable,
            AskError::Execution(_) | AskError::Internal(_) => AbortKind::QueryFailed,
        };

        Self {
            stage,
            kind,
            message: error.message().to_string(),
            sql,
        }
    }

    /// Returns the transport-neutral classification of this abort.
    pub fn status_hint(&self) -> StatusHint {
        match self.kind {
            AbortKind::NoQuestion | AbortKind::NoSql => StatusHint::Client,
            AbortKind::Backend | AbortKind::EmptyResponse => StatusHint::Upstream,
            AbortKind::UnsafeSql(_) => StatusHint::Rejected,
            AbortKind::StoreUnavailable | AbortKind::QueryFailed => StatusHint::Failed,
        }
    }

    /// Returns the refusal reason for gate rejections.
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self.kind {
            AbortKind::UnsafeSql(reason) => Some(reason),
            _ => None,
        }
    }

    /// Converts into the outbound failure body.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message.clone(),
            sql: self.sql.clone(),
        }
    }
}

impl fmt::Display for Aborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Aborted {}

/// Successful result of a request: the SQL that ran and its rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    /// The statement that ran, as executed.
    pub sql: String,
    /// Result rows in store order.
    pub rows: Vec<ResultRow>,
}

/// Outbound failure body: `{"error": ..., "sql"?: ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Human-readable failure message.
    pub error: String,
    /// Offending SQL, omitted when no statement was involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}
