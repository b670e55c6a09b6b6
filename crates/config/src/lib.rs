//! Configuration management for the chat query router
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (CHAT_ROUTER__ prefix)
//!
//! The context vocabulary (area gazetteer, service synonyms, intent keywords)
//! is separate and loaded from its own YAML file when configured.

pub mod settings;
pub mod vocabulary;

pub use settings::{
    load_settings, load_settings_from, LlmProvider, LlmSettings, ObservabilityConfig,
    PersistenceConfig, RouterConfig, RuntimeEnvironment, SearchConfig, Settings,
    MIN_WRITER_MEMORY_BYTES,
};
pub use vocabulary::{ContextVocabulary, IntentKeyword, ServiceKeyword};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
