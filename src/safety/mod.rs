//! Query safety gate.
//!
//! Classifies untrusted SQL text as a safe read or rejects it with a reason.
//! Only an [`AcceptedStatement`] can reach the store, and only the gate can
//! produce one.

mod fence;
mod gate;

pub use fence::strip_code_fences;
pub use gate::{classify_sql, SqlClassifier, FORBIDDEN_KEYWORDS, READ_VERBS};

use std::fmt;

/// SQL text produced by the synthesizer, untrusted until classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStatement {
    raw: String,
}

impl CandidateStatement {
    /// Wraps raw SQL text.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Returns the text exactly as produced.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the trimmed, case-folded form used for inspection.
    pub fn normalized(&self) -> String {
        self.raw.trim().to_uppercase()
    }

    /// Returns true if the candidate has no text after trimming.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Consumes the candidate, returning its text.
    pub fn into_raw(self) -> String {
        self.raw
    }
}

impl fmt::Display for CandidateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// SQL text that passed the gate.
///
/// The field is private to the safety module, so the executor can trust
/// that every value it receives went through [`SqlClassifier::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedStatement {
    sql: String,
}

impl AcceptedStatement {
    /// Returns the SQL text to execute.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Consumes the statement, returning its SQL text.
    pub fn into_sql(self) -> String {
        self.sql
    }
}

impl fmt::Display for AcceptedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Why the gate refused a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// Nothing left after trimming and fence stripping.
    EmptyStatement,
    /// The leading token is not `SELECT` or `WITH`.
    NotAReadStatement,
    /// A blacklisted keyword appears as a whole word.
    ForbiddenKeyword(&'static str),
}

impl RejectionReason {
    /// Returns the keyword that triggered the rejection, if any.
    pub fn offending_token(&self) -> Option<&'static str> {
        match self {
            Self::ForbiddenKeyword(keyword) => Some(keyword),
            _ => None,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStatement => write!(f, "empty statement"),
            Self::NotAReadStatement => write!(f, "not a read statement"),
            Self::ForbiddenKeyword(keyword) => write!(f, "forbidden keyword: {}", keyword),
        }
    }
}

/// A refused statement together with the text that was inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The reason for refusal.
    pub reason: RejectionReason,
    /// The trimmed, fence-stripped text that was refused.
    pub statement: String,
}

impl Rejection {
    /// Returns the keyword that triggered the rejection, if any.
    pub fn offending_token(&self) -> Option<&'static str> {
        self.reason.offending_token()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Outcome of classifying a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    /// Safe to run against the read-only store.
    Accepted(AcceptedStatement),
    /// Must never reach the store.
    Rejected(Rejection),
}

impl SafetyVerdict {
    /// Returns true if the statement was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Returns the inspected text, whether accepted or rejected.
    pub fn statement_text(&self) -> &str {
        match self {
            Self::Accepted(accepted) => accepted.sql(),
            Self::Rejected(rejection) => &rejection.statement,
        }
    }

    /// Converts the verdict into a `Result`.
    pub fn into_result(self) -> std::result::Result<AcceptedStatement, Rejection> {
        match self {
            Self::Accepted(accepted) => Ok(accepted),
            Self::Rejected(rejection) => Err(rejection),
        }
    }
}
