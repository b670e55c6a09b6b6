//! Structured record store trait and the query shapes issued against it

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ServiceRecord, StoreError};

/// AND of prefix terms, matched against the description field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSearchExpression {
    terms: Vec<String>,
}

impl TextSearchExpression {
    /// Build from already-normalised terms. Returns `None` for no terms.
    pub fn new(terms: Vec<String>) -> Option<Self> {
        if terms.is_empty() {
            None
        } else {
            Some(Self { terms })
        }
    }

    /// Terms, each implicitly followed by a prefix wildcard
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// The query shapes the router issues against the services collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordQuery {
    /// Full-text search over `description`
    FullText(TextSearchExpression),
    /// OR of case-insensitive substring matches on `name`
    NameContainsAny(Vec<String>),
    /// Case-insensitive substring match on `category`
    CategoryContains(String),
}

impl RecordQuery {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            RecordQuery::FullText(_) => "full_text",
            RecordQuery::NameContainsAny(_) => "keyword",
            RecordQuery::CategoryContains(_) => "category",
        }
    }
}

/// Read access to service listings
///
/// Implementations:
/// - `ServiceIndex` (rag crate) - tantivy index over the catalog
///
/// Results come back in the store's native order; callers do not re-rank.
#[async_trait]
pub trait ServiceStore: Send + Sync + 'static {
    /// Run one query, returning at most `limit` records
    async fn query(
        &self,
        query: &RecordQuery,
        limit: usize,
    ) -> Result<Vec<ServiceRecord>, StoreError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
