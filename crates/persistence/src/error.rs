//! Persistence errors

use chat_router_core::StoreError;
use scylla::transport::errors::{NewSessionError, QueryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<NewSessionError> for PersistenceError {
    fn from(err: NewSessionError) -> Self {
        PersistenceError::Connection(err.to_string())
    }
}

impl From<QueryError> for PersistenceError {
    fn from(err: QueryError) -> Self {
        PersistenceError::Query(err.to_string())
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Connection(msg) => StoreError::Connection(msg),
            PersistenceError::Configuration(msg) | PersistenceError::SchemaError(msg) => {
                StoreError::Configuration(msg)
            },
            PersistenceError::Query(msg) => StoreError::Query(msg),
            PersistenceError::InvalidData(msg) => StoreError::InvalidData(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let fatal: StoreError = PersistenceError::Connection("refused".into()).into();
        assert!(fatal.is_fatal());

        let transient: StoreError = PersistenceError::Query("timeout".into()).into();
        assert!(!transient.is_fatal());
    }
}
