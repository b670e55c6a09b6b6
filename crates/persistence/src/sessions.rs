//! Session context stores
//!
//! Both implementations honour the merge contract of [`SessionContextStore`]:
//! a merge upserts the session and only overwrites fields for which the
//! update carries a known value.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use scylla::frame::response::result::CqlValue;

use chat_router_core::{ContextUpdate, SessionContext, SessionContextStore, StoreError};

use crate::client::ScyllaClient;
use crate::error::PersistenceError;

/// ScyllaDB-backed session context store
pub struct ScyllaSessionStore {
    client: ScyllaClient,
}

impl ScyllaSessionStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn fetch(&self, session_id: &str) -> Result<Option<SessionContext>, PersistenceError> {
        let query = format!(
            "SELECT session_id, service_type, location, user_intent FROM {}.sessions WHERE session_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (session_id, service_type, location, user_intent): (
                    String,
                    Option<String>,
                    Option<String>,
                    Option<String>,
                ) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                return Ok(Some(SessionContext {
                    session_id,
                    service_type,
                    location,
                    user_intent,
                }));
            }
        }

        Ok(None)
    }

    /// One UPDATE that touches only the known fields.
    ///
    /// CQL UPDATE is an upsert and a single-row write is atomic, so a merge
    /// is never observed half-applied and absent fields are never written.
    async fn upsert(&self, session_id: &str, update: &ContextUpdate) -> Result<(), PersistenceError> {
        let (query, values) = upsert_statement(
            self.client.keyspace(),
            session_id,
            update,
            Utc::now().timestamp_millis(),
        );
        self.client.session().query_unpaged(query, values).await?;
        Ok(())
    }
}

/// Build the session upsert. Only fields the update knows are assigned, so a
/// partial update never clears stored values.
fn upsert_statement(
    keyspace: &str,
    session_id: &str,
    update: &ContextUpdate,
    updated_at_ms: i64,
) -> (String, Vec<CqlValue>) {
    let mut assignments = vec!["updated_at = ?"];
    let mut values = vec![CqlValue::BigInt(updated_at_ms)];

    let fields = [
        ("service_type = ?", update.service_type()),
        ("location = ?", update.location()),
        ("user_intent = ?", update.user_intent()),
    ];
    for (assignment, value) in fields {
        if let Some(value) = value {
            assignments.push(assignment);
            values.push(CqlValue::Text(value.to_string()));
        }
    }
    values.push(CqlValue::Text(session_id.to_string()));

    let query = format!(
        "UPDATE {}.sessions SET {} WHERE session_id = ?",
        keyspace,
        assignments.join(", ")
    );
    (query, values)
}

#[async_trait]
impl SessionContextStore for ScyllaSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionContext>, StoreError> {
        Ok(self.fetch(session_id).await?)
    }

    async fn merge(
        &self,
        session_id: &str,
        update: &ContextUpdate,
    ) -> Result<SessionContext, StoreError> {
        self.upsert(session_id, update).await?;

        let merged = match self.fetch(session_id).await? {
            Some(context) => context,
            None => {
                let mut context = SessionContext::new(session_id);
                context.apply(update);
                context
            },
        };

        tracing::debug!(
            session_id = %session_id,
            service_type = ?merged.service_type,
            location = ?merged.location,
            "Session context merged"
        );

        Ok(merged)
    }
}

/// Process-local session context store
///
/// Used when persistence is disabled and in tests. Each merge runs under the
/// map's shard lock for that key.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionContext>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionContextStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionContext>, StoreError> {
        Ok(self.sessions.get(session_id).map(|entry| entry.value().clone()))
    }

    async fn merge(
        &self,
        session_id: &str,
        update: &ContextUpdate,
    ) -> Result<SessionContext, StoreError> {
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext::new(session_id));
        entry.apply(update);
        Ok(entry.value().clone())
    }
}
