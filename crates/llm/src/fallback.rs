//! Generative fallback responder
//!
//! Wraps a completion backend with fixed error handling: any backend failure
//! (network, auth, malformed or empty output) becomes [`FALLBACK_APOLOGY`].
//! History is passed through as given; truncation is the caller's job.

use std::sync::Arc;

use chat_router_core::Message;

use crate::backend::FinishReason;
use crate::prompt::{PromptBuilder, FALLBACK_SYSTEM_PROMPT};
use crate::{LlmBackend, LlmError};

/// Returned whenever the backend cannot produce an answer
pub const FALLBACK_APOLOGY: &str =
    "I'm sorry, I'm having trouble answering right now. Please try again shortly.";

#[derive(Clone)]
pub struct FallbackResponder {
    backend: Arc<dyn LlmBackend>,
    system_prompt: String,
}

impl FallbackResponder {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend,
            system_prompt: FALLBACK_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Whether the backend answers its health endpoint
    pub async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    /// Generated answer to `message`, or the fixed apology
    pub async fn respond(&self, message: &str, history: &[Message]) -> String {
        match self.try_respond(message, history).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    model = %self.backend.model_name(),
                    error = %e,
                    "Fallback generation failed, returning apology"
                );
                metrics::counter!("chat_router_fallback_failures_total").increment(1);
                FALLBACK_APOLOGY.to_string()
            },
        }
    }

    async fn try_respond(&self, message: &str, history: &[Message]) -> Result<String, LlmError> {
        let messages = PromptBuilder::new()
            .system_prompt(&self.system_prompt)
            .with_history(history)
            .user_message(message)
            .build();

        let result = self.backend.generate(&messages).await?;

        let text = result.text.trim();
        if text.is_empty() {
            return Err(LlmError::InvalidResponse("Empty completion".to_string()));
        }

        if result.finish_reason == FinishReason::Length {
            tracing::warn!(
                model = %self.backend.model_name(),
                tokens = result.tokens,
                "Fallback answer hit the token limit"
            );
            metrics::counter!("chat_router_fallback_truncated_total").increment(1);
        }

        tracing::debug!(
            model = %self.backend.model_name(),
            tokens = result.tokens,
            total_time_ms = result.total_time_ms,
            "Fallback answer generated"
        );

        Ok(text.to_string())
    }
}
