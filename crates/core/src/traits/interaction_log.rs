//! Append-only chat log trait

use async_trait::async_trait;

use crate::{InteractionLogEntry, StoreError};

/// Sink for routed decisions. Write-only.
#[async_trait]
pub trait InteractionLog: Send + Sync + 'static {
    async fn append(&self, entry: &InteractionLogEntry) -> Result<(), StoreError>;
}
