//! Query router
//!
//! One call to [`QueryRouter::route`] walks:
//!
//! ```text
//! Start -> RecordsTried -> RecordsFound                      (records)
//!                       -> RecordsEmpty -> ContextIncomplete (clarify)
//!                                       -> ContextComplete   (fallback)
//! ```
//!
//! and finishes with exactly one interaction log write, whichever branch
//! produced the answer. Anything unexpected, including a panic in a
//! collaborator, becomes an `error` response.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;

use chat_router_config::RouterConfig;
use chat_router_core::{Message, RouterResponse, SessionContext, SessionContextStore};
use chat_router_llm::FallbackResponder;
use chat_router_persistence::InteractionLogger;
use chat_router_rag::RecordSearch;
use chat_router_text_processing::ContextExtractor;

use crate::response::{clarify_question, format_records, ERROR_APOLOGY};
use crate::AgentError;

/// Routes chat messages to records, a clarifying question or the fallback
///
/// All collaborators are injected; the router holds no per-conversation
/// state of its own.
#[derive(Clone)]
pub struct QueryRouter {
    extractor: ContextExtractor,
    search: RecordSearch,
    sessions: Arc<dyn SessionContextStore>,
    responder: FallbackResponder,
    logger: InteractionLogger,
    config: RouterConfig,
}

impl QueryRouter {
    pub fn new(
        extractor: ContextExtractor,
        search: RecordSearch,
        sessions: Arc<dyn SessionContextStore>,
        responder: FallbackResponder,
        logger: InteractionLogger,
    ) -> Self {
        Self {
            extractor,
            search,
            sessions,
            responder,
            logger,
            config: RouterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route one user message. Never fails; errors surface as `source=error`.
    pub async fn route(
        &self,
        message: &str,
        history: &[Message],
        session_id: Option<&str>,
    ) -> RouterResponse {
        let start = Instant::now();
        let session_id = session_id.map(str::trim).filter(|id| !id.is_empty());

        let outcome = AssertUnwindSafe(self.decide(message, history, session_id))
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(
                    session_id = ?session_id,
                    error = %e,
                    "Routing failed"
                );
                RouterResponse::error(ERROR_APOLOGY)
            },
            Err(panic) => {
                tracing::error!(
                    session_id = ?session_id,
                    panic = %panic_message(panic.as_ref()),
                    "Routing panicked"
                );
                RouterResponse::error(ERROR_APOLOGY)
            },
        };

        let actor_id = session_id.unwrap_or(self.config.anonymous_actor.as_str());
        self.logger
            .log(actor_id, message, response.text(), response.source)
            .await;

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::counter!("chat_router_decisions_total", "source" => response.source.as_str())
            .increment(1);
        metrics::histogram!("chat_router_route_latency_ms").record(elapsed_ms);

        tracing::info!(
            session_id = ?session_id,
            source = %response.source,
            latency_ms = elapsed_ms,
            "Message routed"
        );

        response
    }

    async fn decide(
        &self,
        message: &str,
        history: &[Message],
        session_id: Option<&str>,
    ) -> Result<RouterResponse, AgentError> {
        let context = match session_id {
            Some(id) => self.merge_context(id, message, history).await,
            None => None,
        };

        if let Some(records) = self.search.search(message).await? {
            tracing::debug!(records = records.len(), "Answering from records");
            return Ok(RouterResponse::records(format_records(&records), records));
        }

        let location = self.extractor.extract_location(message, history);
        let service_type = self.extractor.extract_service_type(message);
        let location_known =
            location.is_some() || context.as_ref().is_some_and(SessionContext::has_location);
        let service_type_known = service_type.is_some()
            || context.as_ref().is_some_and(SessionContext::has_service_type);

        if let Some(question) = clarify_question(location_known, service_type_known) {
            tracing::debug!(
                location_known,
                service_type_known,
                "Context incomplete, asking user"
            );
            return Ok(RouterResponse::clarify(question));
        }

        tracing::debug!(
            location = ?location,
            service_type = ?service_type,
            "No records despite complete context, using fallback"
        );
        let recent = recent_history(history, self.config.max_history_turns);
        let text = self.responder.respond(message, recent).await;
        Ok(RouterResponse::fallback(text))
    }

    /// Merge extracted signals into the session. A store failure is logged
    /// and treated as "no stored context".
    async fn merge_context(
        &self,
        session_id: &str,
        message: &str,
        history: &[Message],
    ) -> Option<SessionContext> {
        let update = self.extractor.extract(message, history);
        match self.sessions.merge(session_id, &update).await {
            Ok(context) => Some(context),
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "Session context update failed, continuing without it"
                );
                None
            },
        }
    }
}

fn recent_history(history: &[Message], max_turns: usize) -> &[Message] {
    let skip = history.len().saturating_sub(max_turns);
    &history[skip..]
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
