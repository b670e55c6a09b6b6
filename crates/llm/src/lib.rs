//! LLM integration for the generative fallback
//!
//! Features:
//! - Multiple backend support (Ollama, OpenAI-compatible)
//! - Retry with exponential backoff for transient failures
//! - `FallbackResponder` that never surfaces backend errors to callers

pub mod backend;
pub mod factory;
pub mod fallback;
pub mod prompt;

pub use backend::{
    FinishReason, GenerationResult, LlmBackend, LlmConfig, OllamaBackend, OpenAIBackend,
    OpenAIConfig,
};
pub use factory::{create_backend, create_responder};
pub use fallback::{FallbackResponder, FALLBACK_APOLOGY};
pub use prompt::{PromptBuilder, FALLBACK_SYSTEM_PROMPT};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for chat_router_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => chat_router_core::Error::Configuration(msg),
            other => chat_router_core::Error::Llm(other.to_string()),
        }
    }
}
