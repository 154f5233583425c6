//! Error types for askcars.
//!
//! Defines the main error enum used throughout the pipeline.

use thiserror::Error;

/// Main error type for askcars operations.
#[derive(Error, Debug)]
pub enum AskError {
    /// Caller input errors (empty question, empty SQL).
    #[error("Input error: {0}")]
    Input(String),

    /// Synthesis backend errors (unreachable, non-success status, bad payload).
    #[error("LLM error: {0}")]
    Backend(String),

    /// The synthesis backend answered but produced no usable text.
    #[error("LLM error: {0}")]
    EmptyResponse(String),

    /// The tabular store could not be opened (missing file, bad path, etc.)
    #[error("Store error: {0}")]
    StoreUnavailable(String),

    /// The store rejected an accepted statement (syntax error, unknown column, etc.)
    #[error("Query error: {0}")]
    Execution(String),

    /// Configuration errors (invalid config file, missing API key, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AskError {
    /// Creates an input error with the given message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Creates a backend error with the given message.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Creates an empty-response error with the given message.
    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::EmptyResponse(msg.into())
    }

    /// Creates a store-unavailable error with the given message.
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Input(msg)
            | Self::Backend(msg)
            | Self::EmptyResponse(msg)
            | Self::StoreUnavailable(msg)
            | Self::Execution(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Input(_) => "Input Error",
            Self::Backend(_) => "LLM Error",
            Self::EmptyResponse(_) => "LLM Error",
            Self::StoreUnavailable(_) => "Store Error",
            Self::Execution(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using AskError.
pub type Result<T> = std::result::Result<T, AskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_backend() {
        let err = AskError::backend("Groq API error: invalid model");
        assert_eq!(err.to_string(), "LLM error: Groq API error: invalid model");
        assert_eq!(err.category(), "LLM Error");
    }

    #[test]
    fn test_error_display_execution() {
        let err = AskError::execution("no such column: colour");
        assert_eq!(err.to_string(), "Query error: no such column: colour");
        assert_eq!(err.category(), "Query Error");
    }

    #[test]
    fn test_error_display_store_unavailable() {
        let err = AskError::store_unavailable("Database file not found: cars.db");
        assert_eq!(
            err.to_string(),
            "Store error: Database file not found: cars.db"
        );
        assert_eq!(err.category(), "Store Error");
    }

    #[test]
    fn test_error_display_config() {
        let err = AskError::config("Missing GROQ_API_KEY");
        assert_eq!(err.to_string(), "Configuration error: Missing GROQ_API_KEY");
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_message_strips_category() {
        let err = AskError::input("No question provided");
        assert_eq!(err.message(), "No question provided");
        assert_eq!(err.category(), "Input Error");

        let err = AskError::empty_response("LLM returned an empty response");
        assert_eq!(err.message(), "LLM returned an empty response");
    }

    #[test]
    fn test_error_display_internal() {
        let err = AskError::internal("unexpected state");
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.category(), "Internal Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AskError>();
    }
}
