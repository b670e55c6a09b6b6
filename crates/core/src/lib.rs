//! Core traits and types for the chat query router
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation messages and roles
//! - Service records read from the structured store
//! - Per-session extracted context and its merge rule
//! - Router responses and interaction log entries
//! - Store traits for pluggable backends (records, sessions, chat log)
//! - Error types

pub mod conversation;
pub mod error;
pub mod routing;
pub mod service;
pub mod session;
pub mod traits;

pub use conversation::{Message, Role};
pub use error::{Error, Result, StoreError};
pub use routing::{InteractionLogEntry, RouteSource, RouterResponse};
pub use service::{ContactInfo, ServiceRecord};
pub use session::{ContextUpdate, SessionContext};

pub use traits::{
    InteractionLog, RecordQuery, ServiceStore, SessionContextStore, TextSearchExpression,
};
