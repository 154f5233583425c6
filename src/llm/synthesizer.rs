//! NL-to-SQL synthesis.
//!
//! Turns a question into candidate SQL through an LLM backend. The result is
//! untrusted: the safety gate re-checks it no matter what the prompt asked for.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{AskError, Result};
use crate::llm::prompt::build_messages;
use crate::llm::LlmClient;
use crate::safety::{strip_code_fences, CandidateStatement};

/// Message used when the backend answers without usable text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "LLM returned an empty response";

/// Capability interface for turning a question into candidate SQL.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Produces candidate SQL for a question.
    ///
    /// Fails with `Backend` when the service is unreachable or answers with a
    /// non-success status, and with `EmptyResponse` when no text is left.
    async fn synthesize(&self, question: &str) -> Result<CandidateStatement>;
}

/// Synthesizer backed by a chat completion client.
pub struct LlmSynthesizer {
    client: Box<dyn LlmClient>,
}

impl LlmSynthesizer {
    /// Creates a synthesizer over the given client.
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Synthesizer for LlmSynthesizer {
    async fn synthesize(&self, question: &str) -> Result<CandidateStatement> {
        debug!(question_len = question.len(), "Starting SQL synthesis");

        let messages = build_messages(question);
        let raw = self.client.complete(&messages).await?;
        let sql = strip_code_fences(&raw);

        if sql.is_empty() {
            return Err(AskError::empty_response(EMPTY_RESPONSE_MESSAGE));
        }

        info!(sql = %sql, "Generated SQL");
        Ok(CandidateStatement::new(sql))
    }
}

/// Synthesizer returning a fixed response, for tests.
#[derive(Debug, Default)]
pub struct StaticSynthesizer {
    response: Option<String>,
    backend_error: Option<String>,
    calls: AtomicUsize,
}

impl StaticSynthesizer {
    /// Always returns `sql` (after fence stripping, like the real synthesizer).
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            response: Some(sql.into()),
            ..Self::default()
        }
    }

    /// Always fails with a backend error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            backend_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Returns how many times synthesis was requested.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for StaticSynthesizer {
    async fn synthesize(&self, _question: &str) -> Result<CandidateStatement> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.backend_error {
            return Err(AskError::backend(message.clone()));
        }

        let sql = strip_code_fences(self.response.as_deref().unwrap_or_default());
        if sql.is_empty() {
            return Err(AskError::empty_response(EMPTY_RESPONSE_MESSAGE));
        }
        Ok(CandidateStatement::new(sql))
    }
}
