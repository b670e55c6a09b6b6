//! Session context persistence trait

use async_trait::async_trait;

use crate::{ContextUpdate, SessionContext, StoreError};

/// Per-session context storage
///
/// `merge` is an upsert: it creates the session when absent and otherwise
/// applies [`SessionContext::apply`] semantics, so a blank incoming field
/// never overwrites a stored value. A single `merge` call must never be
/// observed half-applied.
#[async_trait]
pub trait SessionContextStore: Send + Sync + 'static {
    /// Fetch the stored context, `None` if the session is unknown
    async fn get(&self, session_id: &str) -> Result<Option<SessionContext>, StoreError>;

    /// Merge `update` into the stored context and return the result
    async fn merge(
        &self,
        session_id: &str,
        update: &ContextUpdate,
    ) -> Result<SessionContext, StoreError>;
}
