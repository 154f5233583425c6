//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::config::LlmConfig;
use crate::error::{AskError, Result};
use crate::llm::{LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig};

/// Creates an LLM client from configuration.
///
/// The API key, for providers that need one, is read from the provider's
/// environment variable (`GROQ_API_KEY` or `OPENAI_API_KEY`).
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let provider: LlmProvider = config.provider.parse().map_err(AskError::config)?;
    let api_key = provider
        .api_key_env()
        .and_then(|var| std::env::var(var).ok())
        .filter(|key| !key.trim().is_empty());

    build_client(provider, config, api_key)
}

/// Creates an LLM client for the given provider with an explicit API key.
///
/// A missing key for a provider that requires one is a configuration error,
/// reported before any network call.
pub fn build_client(
    provider: LlmProvider,
    config: &LlmConfig,
    api_key: Option<String>,
) -> Result<Box<dyn LlmClient>> {
    let Some(base_url) = provider.default_base_url() else {
        return Ok(Box::new(MockLlmClient::new()));
    };

    let base_url = config.base_url.as_deref().unwrap_or(base_url);
    let model = config.model.as_deref().unwrap_or(provider.default_model());

    let mut client_config =
        OpenAiConfig::new(provider.label(), base_url, model).with_timeout(config.timeout_secs);

    if let Some(temperature) = config.temperature.or(provider.default_temperature()) {
        client_config = client_config.with_temperature(temperature);
    }

    if let Some(var) = provider.api_key_env() {
        let key = api_key.ok_or_else(|| AskError::config(format!("Missing {var}")))?;
        client_config = client_config.with_api_key(key);
    }

    Ok(Box::new(OpenAiClient::new(client_config)?))
}
