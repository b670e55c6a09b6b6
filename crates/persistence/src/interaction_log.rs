//! Interaction logging
//!
//! Every routed message produces one append-only row. Sinks implement
//! [`InteractionLog`]; [`InteractionLogger`] wraps a sink with best-effort
//! semantics so a failed write is reported but never reaches the caller.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use chat_router_core::{InteractionLog, InteractionLogEntry, RouteSource, StoreError};

use crate::client::ScyllaClient;
use crate::error::PersistenceError;

/// ScyllaDB chat log, partitioned by day and actor
pub struct ScyllaInteractionLog {
    client: ScyllaClient,
}

impl ScyllaInteractionLog {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn insert(&self, entry: &InteractionLogEntry) -> Result<(), PersistenceError> {
        let partition_date = entry.timestamp.format("%Y-%m-%d").to_string();

        let query = format!(
            "INSERT INTO {}.chat_logs (
                partition_date, actor_id, timestamp, id, query, response, source
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    partition_date,
                    entry.actor_id.as_str(),
                    entry.timestamp.timestamp_millis(),
                    Uuid::new_v4(),
                    entry.query.as_str(),
                    entry.response.as_str(),
                    entry.source.as_str(),
                ),
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl InteractionLog for ScyllaInteractionLog {
    async fn append(&self, entry: &InteractionLogEntry) -> Result<(), StoreError> {
        Ok(self.insert(entry).await?)
    }
}

/// Process-local chat log
#[derive(Default)]
pub struct InMemoryInteractionLog {
    entries: Mutex<Vec<InteractionLogEntry>>,
}

impl InMemoryInteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far, oldest first
    pub fn entries(&self) -> Vec<InteractionLogEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl InteractionLog for InMemoryInteractionLog {
    async fn append(&self, entry: &InteractionLogEntry) -> Result<(), StoreError> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Best-effort logger in front of an [`InteractionLog`] sink
#[derive(Clone)]
pub struct InteractionLogger {
    sink: Arc<dyn InteractionLog>,
}

impl InteractionLogger {
    pub fn new(sink: Arc<dyn InteractionLog>) -> Self {
        Self { sink }
    }

    /// Append one entry. Failures go to the error log and the
    /// `chat_router_log_failures_total` counter; returns whether the write landed.
    pub async fn log(
        &self,
        actor_id: &str,
        query: &str,
        response: &str,
        source: RouteSource,
    ) -> bool {
        let entry = InteractionLogEntry::new(actor_id, query, response, source);
        self.log_entry(&entry).await
    }

    pub async fn log_entry(&self, entry: &InteractionLogEntry) -> bool {
        match self.sink.append(entry).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    actor_id = %entry.actor_id,
                    source = %entry.source,
                    error = %e,
                    "Failed to write interaction log"
                );
                metrics::counter!("chat_router_log_failures_total").increment(1);
                false
            },
        }
    }
}
