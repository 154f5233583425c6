//! Command-line argument parsing for askcars.
//!
//! Uses clap derive. Flags given here override the config file and the
//! `ASKCARS_*` environment variables.

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ask questions about the used cars database in plain language.
#[derive(Parser, Debug)]
#[command(name = "askcars")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// LLM provider to use: groq, lmstudio, openai or mock (overrides config)
    #[arg(long, value_name = "PROVIDER", global = true)]
    pub llm: Option<String>,

    /// Path to the SQLite database file (overrides config)
    #[arg(long, value_name = "PATH", global = true)]
    pub database: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to run.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Translate a question to SQL, check it and run it
    Ask {
        /// The question, in natural language
        question: String,

        /// Print the generated SQL and the safety verdict without running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Check and run a SQL statement directly
    Query {
        /// The SQL statement
        sql: String,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies command-line overrides, the highest-precedence layer.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(provider) = &self.llm {
            config.llm.provider = provider.clone();
        }
        if let Some(path) = &self.database {
            config.database.path = path.clone();
        }
    }
}
