//! Error types shared across crates

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised by structured-store backends
///
/// `Connection` and `Configuration` are fatal: no retry or tier fallthrough
/// can fix them, so callers let them propagate. Everything else is treated
/// by the search adapter as "this tier found nothing".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Connection(_) | StoreError::Configuration(_))
    }
}
