//! Router output and audit log types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Message, ServiceRecord};

/// Which branch produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    /// Answered from structured records
    Records,
    /// Answered by the generative fallback
    Fallback,
    /// Asked the user for missing context
    Clarify,
    /// Something unexpected failed; user got an apology
    Error,
}

impl RouteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteSource::Records => "records",
            RouteSource::Fallback => "fallback",
            RouteSource::Clarify => "clarify",
            RouteSource::Error => "error",
        }
    }
}

impl std::fmt::Display for RouteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one routing call. Ephemeral; persistence is the logger's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterResponse {
    pub source: RouteSource,
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<ServiceRecord>>,
}

impl RouterResponse {
    pub fn records(text: impl Into<String>, records: Vec<ServiceRecord>) -> Self {
        Self {
            source: RouteSource::Records,
            message: Message::assistant(text),
            records: Some(records),
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self::text_only(RouteSource::Fallback, text)
    }

    pub fn clarify(text: impl Into<String>) -> Self {
        Self::text_only(RouteSource::Clarify, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::text_only(RouteSource::Error, text)
    }

    fn text_only(source: RouteSource, text: impl Into<String>) -> Self {
        Self {
            source,
            message: Message::assistant(text),
            records: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// One append-only audit row, written once per routing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionLogEntry {
    /// Session id, or a placeholder actor for anonymous calls
    pub actor_id: String,
    pub query: String,
    pub response: String,
    pub source: RouteSource,
    pub timestamp: DateTime<Utc>,
}

impl InteractionLogEntry {
    pub fn new(
        actor_id: impl Into<String>,
        query: impl Into<String>,
        response: impl Into<String>,
        source: RouteSource,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            query: query.into(),
            response: response.into(),
            source,
            timestamp: Utc::now(),
        }
    }
}
