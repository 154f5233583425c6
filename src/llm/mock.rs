//! Mock LLM clients for testing.
//!
//! Provides deterministic responses based on input patterns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AskError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Clones share one call counter, so a test can keep a handle while the
/// client itself is boxed inside a synthesizer.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    calls: Arc<AtomicUsize>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the input contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Returns how many completions were requested.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Generates a mock response based on the input.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if input_lower.contains("cheap") || input_lower.contains("under 10000") {
            return "SELECT * FROM cars WHERE price_eur < 10000".to_string();
        }

        if input_lower.contains("how many") || input_lower.contains("count") {
            return "```sql\nSELECT COUNT(*) AS total FROM cars\n```".to_string();
        }

        if input_lower.contains("brands") {
            return "SELECT DISTINCT brand FROM cars ORDER BY brand".to_string();
        }

        if input_lower.contains("delete") || input_lower.contains("drop") {
            return "DROP TABLE cars;".to_string();
        }

        "I don't understand that question. Could you please rephrase it?".to_string()
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let input = Self::extract_user_input(messages);
        Ok(self.mock_response(&input))
    }
}

/// LLM client whose every completion fails like an unreachable backend.
#[derive(Debug, Clone)]
pub struct FailingLlmClient {
    message: String,
}

impl FailingLlmClient {
    /// Creates a client failing with the given backend message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        Err(AskError::backend(self.message.clone()))
    }
}
