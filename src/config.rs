//! Configuration management for askcars.
//!
//! Handles loading configuration from a TOML file and environment variables.
//! API keys are never read from the file; the client factory takes them from
//! the environment.

use crate::error::{AskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::llm::openai::DEFAULT_TIMEOUT_SECS;

/// Environment variable overriding `[llm] provider`.
pub const ENV_LLM_PROVIDER: &str = "ASKCARS_LLM_PROVIDER";
/// Environment variable overriding `[llm] model`.
pub const ENV_LLM_MODEL: &str = "ASKCARS_LLM_MODEL";
/// Environment variable overriding `[database] path`.
pub const ENV_DATABASE: &str = "ASKCARS_DATABASE";

/// Main configuration structure for askcars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Database location.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "groq", "lmstudio", "openai" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name; the provider default when unset.
    #[serde(default)]
    pub model: Option<String>,

    /// Chat completions URL; the provider default when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Sampling temperature; the provider default when unset.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Database location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file holding the `cars` table.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("cars.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("askcars")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AskError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AskError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies `ASKCARS_*` environment variables on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Applies overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get(ENV_LLM_PROVIDER) {
            self.llm.provider = provider;
        }
        if let Some(model) = get(ENV_LLM_MODEL) {
            self.llm.model = Some(model);
        }
        if let Some(path) = get(ENV_DATABASE) {
            self.database.path = PathBuf::from(path);
        }
    }
}
