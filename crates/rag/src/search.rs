//! Tiered record search
//!
//! Tries three strategies in order and returns the first non-empty result:
//! 1. full-text: every significant term as a prefix over `description`
//! 2. keyword: any significant term as a substring of `name`
//! 3. category: the raw query as a substring of `category`
//!
//! A tier that errors is logged and treated as empty. Only fatal store errors
//! (connection, configuration) reach the caller. Results keep the store's
//! order; nothing is re-ranked across or within tiers.

use std::sync::Arc;

use chat_router_core::{RecordQuery, ServiceRecord, ServiceStore, StoreError, TextSearchExpression};
use chat_router_text_processing::search_terms;

/// One search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTier {
    FullText,
    Keyword,
    Category,
}

impl SearchTier {
    pub const ORDER: [SearchTier; 3] = [SearchTier::FullText, SearchTier::Keyword, SearchTier::Category];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchTier::FullText => "full_text",
            SearchTier::Keyword => "keyword",
            SearchTier::Category => "category",
        }
    }

    /// Store query for this tier, or `None` when the message yields nothing
    /// to search for
    pub fn build_query(&self, query: &str) -> Option<RecordQuery> {
        match self {
            SearchTier::FullText => {
                TextSearchExpression::new(search_terms(query)).map(RecordQuery::FullText)
            },
            SearchTier::Keyword => {
                let terms = search_terms(query);
                (!terms.is_empty()).then(|| RecordQuery::NameContainsAny(terms))
            },
            SearchTier::Category => {
                let raw = query.trim();
                (!raw.is_empty()).then(|| RecordQuery::CategoryContains(raw.to_string()))
            },
        }
    }
}

/// Search adapter over any [`ServiceStore`]
#[derive(Clone)]
pub struct RecordSearch {
    store: Arc<dyn ServiceStore>,
    limit: usize,
}

impl RecordSearch {
    pub const DEFAULT_LIMIT: usize = 3;

    pub fn new(store: Arc<dyn ServiceStore>) -> Self {
        Self::with_limit(store, Self::DEFAULT_LIMIT)
    }

    pub fn with_limit(store: Arc<dyn ServiceStore>, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Records matching `query`, or `None` when every tier came back empty
    pub async fn search(&self, query: &str) -> Result<Option<Vec<ServiceRecord>>, StoreError> {
        for tier in SearchTier::ORDER {
            let Some(record_query) = tier.build_query(query) else {
                tracing::debug!(tier = tier.as_str(), "No search terms, skipping tier");
                continue;
            };

            match self.store.query(&record_query, self.limit).await {
                Ok(records) if !records.is_empty() => {
                    tracing::debug!(
                        tier = tier.as_str(),
                        records = records.len(),
                        store = self.store.name(),
                        "Search tier matched"
                    );
                    metrics::counter!(
                        "chat_router_search_tier_hits_total",
                        "tier" => tier.as_str()
                    )
                    .increment(1);
                    return Ok(Some(records));
                },
                Ok(_) => {
                    tracing::debug!(tier = tier.as_str(), "Search tier empty");
                },
                Err(e) if e.is_fatal() => {
                    tracing::error!(tier = tier.as_str(), error = %e, "Record store unavailable");
                    return Err(e);
                },
                Err(e) => {
                    tracing::warn!(
                        tier = tier.as_str(),
                        error = %e,
                        "Search tier failed, falling through"
                    );
                },
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_queries() {
        let q = "Need a PLUMBER in al-reem?";
        match SearchTier::FullText.build_query(q) {
            Some(RecordQuery::FullText(expr)) => {
                assert_eq!(expr.terms(), ["plumber", "reem"]);
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            SearchTier::Keyword.build_query(q),
            Some(RecordQuery::NameContainsAny(vec!["plumber".into(), "reem".into()]))
        );
        assert_eq!(
            SearchTier::Category.build_query(q),
            Some(RecordQuery::CategoryContains("Need a PLUMBER in al-reem?".into()))
        );
    }

    #[test]
    fn test_stop_word_only_query_skips_term_tiers() {
        assert_eq!(SearchTier::FullText.build_query("hi there"), None);
        assert_eq!(SearchTier::Keyword.build_query("hi there"), None);
        assert!(SearchTier::Category.build_query("hi there").is_some());
        assert_eq!(SearchTier::Category.build_query("   "), None);
    }
}
