//! Service record search
//!
//! Features:
//! - Tantivy-backed catalog index implementing `ServiceStore`
//! - Three-tier search (full-text, name keyword, category) with fallthrough
//! - YAML/JSON catalog loading with per-record validation

pub mod catalog;
pub mod search;
pub mod service_index;

pub use catalog::{CatalogFile, CatalogLoader};
pub use search::{RecordSearch, SearchTier};
pub use service_index::{ServiceIndex, ServiceIndexConfig};

use chat_router_core::StoreError;
use thiserror::Error;

/// Search errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Search error: {0}")]
    Search(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<RagError> for StoreError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Configuration(msg) => StoreError::Configuration(msg),
            RagError::InvalidRecord(msg) => StoreError::InvalidData(msg),
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<RagError> for chat_router_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Configuration(msg) => chat_router_core::Error::Configuration(msg),
            other => chat_router_core::Error::Search(other.to_string()),
        }
    }
}
