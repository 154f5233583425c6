//! askcars - ask a used cars database questions in plain language.
//!
//! A question is turned into SQL by an LLM, checked by a read-only safety
//! gate, and run against a SQLite snapshot. This library exposes the core
//! modules for the binary and for integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod safety;
