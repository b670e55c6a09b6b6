//! Backend factory
//!
//! Creates the completion backend named by `LlmSettings::provider`.
//!
//! ## Supported Providers
//! - **Ollama**: local models via `/api/chat`
//! - **OpenAI**: OpenAI or any compatible `/chat/completions` server

use std::sync::Arc;

use chat_router_config::{LlmProvider, LlmSettings};

use crate::backend::{LlmBackend, LlmConfig, OllamaBackend, OpenAIBackend, OpenAIConfig};
use crate::fallback::FallbackResponder;
use crate::LlmError;

/// Build the configured backend. Missing credentials fail here, at start-up.
pub fn create_backend(settings: &LlmSettings) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let backend: Arc<dyn LlmBackend> = match settings.provider {
        LlmProvider::Ollama => Arc::new(OllamaBackend::new(LlmConfig::from(settings))?),
        LlmProvider::OpenAI => Arc::new(OpenAIBackend::new(OpenAIConfig::from(settings))?),
    };

    tracing::info!(
        provider = ?settings.provider,
        model = %backend.model_name(),
        endpoint = %settings.endpoint,
        "LLM backend created"
    );

    Ok(backend)
}

/// Fallback responder over the configured backend and system prompt
pub fn create_responder(settings: &LlmSettings) -> Result<FallbackResponder, LlmError> {
    let responder = FallbackResponder::new(create_backend(settings)?);
    Ok(match settings.system_prompt.as_deref() {
        Some(prompt) if !prompt.trim().is_empty() => responder.with_system_prompt(prompt),
        _ => responder,
    })
}
