//! Persistence for the chat query router
//!
//! Provides storage for:
//! - Session context (accumulated location / service type / intent per session)
//! - Interaction log (one append-only row per routed message)
//!
//! Backed by ScyllaDB when enabled, otherwise by process-local stores.

pub mod client;
pub mod error;
pub mod interaction_log;
pub mod schema;
pub mod sessions;

pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use interaction_log::{InMemoryInteractionLog, InteractionLogger, ScyllaInteractionLog};
pub use sessions::{InMemorySessionStore, ScyllaSessionStore};

use chat_router_config::PersistenceConfig;
use chat_router_core::{InteractionLog, SessionContextStore};
use std::sync::Arc;

/// Initialize the persistence layer described by `config`
///
/// Connects to ScyllaDB and ensures the schema when enabled. Connection and
/// schema failures are returned here, once, at start-up.
pub async fn init(config: &PersistenceConfig) -> Result<PersistenceLayer, PersistenceError> {
    if !config.enabled {
        tracing::info!("Persistence disabled, using in-memory stores");
        return Ok(PersistenceLayer::in_memory());
    }

    let client = ScyllaClient::connect(ScyllaConfig::from(config)).await?;
    client.ensure_schema().await?;

    Ok(PersistenceLayer {
        sessions: Arc::new(ScyllaSessionStore::new(client.clone())),
        interaction_log: Arc::new(ScyllaInteractionLog::new(client)),
    })
}

/// Session store plus interaction log sink
#[derive(Clone)]
pub struct PersistenceLayer {
    pub sessions: Arc<dyn SessionContextStore>,
    pub interaction_log: Arc<dyn InteractionLog>,
}

impl PersistenceLayer {
    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
            interaction_log: Arc::new(InMemoryInteractionLog::new()),
        }
    }

    pub fn logger(&self) -> InteractionLogger {
        InteractionLogger::new(self.interaction_log.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_router_core::ContextUpdate;

    #[tokio::test]
    async fn test_disabled_persistence_is_in_memory() {
        let layer = init(&PersistenceConfig::default()).await.unwrap();
        let ctx = layer
            .sessions
            .merge("s1", &ContextUpdate::default().with_location("al reem"))
            .await
            .unwrap();
        assert_eq!(ctx.location.as_deref(), Some("al reem"));
    }
}
