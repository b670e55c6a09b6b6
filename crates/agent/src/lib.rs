//! Chat query router
//!
//! Decides, per incoming message, whether to:
//! - answer from structured service records,
//! - ask the user for missing location or service type,
//! - or hand off to a generative fallback.
//!
//! Every routing call ends in exactly one interaction log write.

pub mod builder;
pub mod response;
pub mod router;
pub mod telemetry;

pub use builder::build_router;
pub use response::{
    clarify_question, format_records, CLARIFY_BOTH, CLARIFY_LOCATION, CLARIFY_SERVICE_TYPE,
    ERROR_APOLOGY, FALLBACK_APOLOGY,
};
pub use router::QueryRouter;
pub use telemetry::init_tracing;

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

impl From<chat_router_config::ConfigError> for AgentError {
    fn from(err: chat_router_config::ConfigError) -> Self {
        AgentError::Configuration(err.to_string())
    }
}

impl From<chat_router_core::StoreError> for AgentError {
    fn from(err: chat_router_core::StoreError) -> Self {
        AgentError::Store(err.to_string())
    }
}

impl From<chat_router_rag::RagError> for AgentError {
    fn from(err: chat_router_rag::RagError) -> Self {
        AgentError::Search(err.to_string())
    }
}

impl From<chat_router_persistence::PersistenceError> for AgentError {
    fn from(err: chat_router_persistence::PersistenceError) -> Self {
        AgentError::Persistence(err.to_string())
    }
}

impl From<chat_router_llm::LlmError> for AgentError {
    fn from(err: chat_router_llm::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}
