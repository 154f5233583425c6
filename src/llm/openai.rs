//! OpenAI-compatible chat completions client.
//!
//! Implements the LlmClient trait for any endpoint speaking the OpenAI chat
//! completions protocol (Groq, LM Studio, OpenAI). One request per call; no
//! retries and no streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{AskError, Result};
use crate::llm::types::Message;
use crate::llm::LlmClient;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OpenAI-compatible client configuration.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Human-readable backend name used in error messages (e.g., "Groq").
    pub label: String,
    /// Full chat completions URL.
    pub base_url: String,
    /// Bearer token, if the backend requires one.
    pub api_key: Option<String>,
    /// Model to use (e.g., "llama-3.3-70b-versatile").
    pub model: String,
    /// Sampling temperature; omitted from the request when unset.
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Creates a new config for the given endpoint and model.
    pub fn new(
        label: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            base_url: base_url.into(),
            api_key: None,
            model: model.into(),
            temperature: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("label", &self.label)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// OpenAI-compatible LLM client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AskError::backend(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the request body for the given messages.
    fn build_request(&self, messages: &[Message]) -> OpenAiRequest {
        OpenAiRequest {
            model: self.config.model.clone(),
            messages: Self::convert_messages(messages),
            temperature: self.config.temperature,
        }
    }

    /// Converts internal messages to OpenAI API format.
    fn convert_messages(messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|m| OpenAiMessage {
                role: m.role.as_str().to_string(),
                content: Some(m.content.clone()),
            })
            .collect()
    }

    /// Maps a non-success response to a backend error.
    fn parse_error(label: &str, status: reqwest::StatusCode, body: &str) -> AskError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return AskError::backend(format!(
                "{label} API error: authentication failed. Check your API key."
            ));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return AskError::backend(format!("{label} API error: rate limited."));
        }

        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            return AskError::backend(format!(
                "{label} API error: {}",
                error_response.error.message
            ));
        }

        AskError::backend(format!("{label} API error ({}): {}", status, body))
    }

    /// Maps a transport failure to a backend error.
    fn request_error(label: &str, error: reqwest::Error) -> AskError {
        if error.is_timeout() {
            AskError::backend(format!("{label} API request timed out."))
        } else if error.is_connect() {
            AskError::backend(format!("Failed to connect to {label} API: {error}"))
        } else {
            AskError::backend(format!("{label} API request failed: {error}"))
        }
    }

    /// Extracts the first choice's text; absent content yields an empty string.
    fn extract_content(label: &str, body: &str) -> Result<String> {
        let response: OpenAiResponse = serde_json::from_str(body)
            .map_err(|e| AskError::backend(format!("Failed to parse {label} response: {e}")))?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let label = self.config.label.as_str();
        let request = self.build_request(messages);

        debug!(
            backend = label,
            model = %self.config.model,
            "Sending chat completion request"
        );

        let mut builder = self
            .client
            .post(&self.config.base_url)
            .header("Content-Type", "application/json")
            .json(&request);

        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::request_error(label, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AskError::backend(format!("Failed to read {label} response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error(label, status, &body));
        }

        Self::extract_content(label, &body)
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiError,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}
