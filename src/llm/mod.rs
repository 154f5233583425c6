//! LLM integration for askcars.
//!
//! Provides the completion client trait, the OpenAI-compatible backends and
//! the synthesizer that turns questions into candidate SQL.

pub mod factory;
pub mod mock;
pub mod openai;
pub mod prompt;
pub mod synthesizer;
pub mod types;

pub use factory::{build_client, create_client};
pub use mock::{FailingLlmClient, MockLlmClient};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use prompt::{build_messages, SYSTEM_PROMPT};
pub use synthesizer::{LlmSynthesizer, StaticSynthesizer, Synthesizer};
pub use types::{Message, Role};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::Result;

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// Returns the complete response as a single string, empty when the
    /// backend answered without content.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Groq hosted inference
    #[default]
    Groq,
    /// Local LM Studio server
    LmStudio,
    /// OpenAI
    OpenAi,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::LmStudio => "lmstudio",
            Self::OpenAi => "openai",
            Self::Mock => "mock",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::LmStudio => "LM Studio",
            Self::OpenAi => "OpenAI",
            Self::Mock => "Mock",
        }
    }

    /// Chat completions URL used when none is configured.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("https://api.groq.com/openai/v1/chat/completions"),
            Self::LmStudio => Some("http://127.0.0.1:1234/v1/chat/completions"),
            Self::OpenAi => Some("https://api.openai.com/v1/chat/completions"),
            Self::Mock => None,
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => "llama-3.3-70b-versatile",
            Self::LmStudio => "phi-3-mini-128k-instruct",
            Self::OpenAi => "gpt-4o",
            Self::Mock => "mock",
        }
    }

    /// Environment variable holding the API key, for providers that need one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::LmStudio | Self::Mock => None,
        }
    }

    /// Sampling temperature sent when none is configured.
    pub fn default_temperature(&self) -> Option<f32> {
        match self {
            Self::LmStudio => Some(0.0),
            _ => None,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "lmstudio" | "lm-studio" => Ok(Self::LmStudio),
            "openai" => Ok(Self::OpenAi),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("groq".parse::<LlmProvider>().unwrap(), LlmProvider::Groq);
        assert_eq!("Groq".parse::<LlmProvider>().unwrap(), LlmProvider::Groq);
        assert_eq!(
            "lmstudio".parse::<LlmProvider>().unwrap(),
            LlmProvider::LmStudio
        );
        assert_eq!(
            "lm-studio".parse::<LlmProvider>().unwrap(),
            LlmProvider::LmStudio
        );
        assert_eq!(
            "OpenAI".parse::<LlmProvider>().unwrap(),
            LlmProvider::OpenAi
        );
        assert_eq!("mock".parse::<LlmProvider>().unwrap(), LlmProvider::Mock);
        assert!("anthropic".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_provider_round_trips_through_as_str() {
        for provider in [
            LlmProvider::Groq,
            LlmProvider::LmStudio,
            LlmProvider::OpenAi,
            LlmProvider::Mock,
        ] {
            assert_eq!(provider.as_str().parse::<LlmProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_provider_presets() {
        assert_eq!(
            LlmProvider::Groq.default_base_url(),
            Some("https://api.groq.com/openai/v1/chat/completions")
        );
        assert_eq!(LlmProvider::Groq.api_key_env(), Some("GROQ_API_KEY"));
        assert_eq!(LlmProvider::LmStudio.api_key_env(), None);
        assert_eq!(LlmProvider::LmStudio.default_temperature(), Some(0.0));
        assert_eq!(LlmProvider::OpenAi.default_model(), "gpt-4o");
        assert_eq!(LlmProvider::Mock.default_base_url(), None);
    }

    #[test]
    fn test_provider_display_and_default() {
        assert_eq!(format!("{}", LlmProvider::LmStudio), "lmstudio");
        assert_eq!(LlmProvider::default(), LlmProvider::Groq);
    }

    #[tokio::test]
    async fn test_mock_client_implements_trait() {
        let client: Box<dyn LlmClient> = Box::new(MockLlmClient::new());
        let messages = vec![Message::user("Show me all brands")];
        let response = client.complete(&messages).await.unwrap();
        assert!(response.contains("SELECT"));
    }
}
