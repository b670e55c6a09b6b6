//! Per-conversation extracted context

use serde::{Deserialize, Serialize};

/// Newly extracted signals for one turn
///
/// Absent or blank fields mean "no signal" and never erase stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_intent: Option<String>,
}

impl ContextUpdate {
    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_user_intent(mut self, intent: impl Into<String>) -> Self {
        self.user_intent = Some(intent.into());
        self
    }

    /// True when no field carries a usable value
    pub fn is_empty(&self) -> bool {
        known(&self.service_type).is_none()
            && known(&self.location).is_none()
            && known(&self.user_intent).is_none()
    }

    pub fn service_type(&self) -> Option<&str> {
        known(&self.service_type)
    }

    pub fn location(&self) -> Option<&str> {
        known(&self.location)
    }

    pub fn user_intent(&self) -> Option<&str> {
        known(&self.user_intent)
    }
}

/// Accumulated context for one session, keyed by `session_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_intent: Option<String>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            service_type: None,
            location: None,
            user_intent: None,
        }
    }

    /// Merge an update field by field.
    ///
    /// A known incoming value replaces the stored one; an absent or blank
    /// incoming value leaves the stored one untouched. Returns whether any
    /// field changed.
    pub fn apply(&mut self, update: &ContextUpdate) -> bool {
        let mut changed = false;
        changed |= merge_field(&mut self.service_type, update.service_type());
        changed |= merge_field(&mut self.location, update.location());
        changed |= merge_field(&mut self.user_intent, update.user_intent());
        changed
    }

    pub fn has_location(&self) -> bool {
        known(&self.location).is_some()
    }

    pub fn has_service_type(&self) -> bool {
        known(&self.service_type).is_some()
    }
}

fn known(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn merge_field(slot: &mut Option<String>, incoming: Option<&str>) -> bool {
    match incoming {
        Some(value) if slot.as_deref() != Some(value) => {
            *slot = Some(value.to_string());
            true
        }
        _ => false,
    }
}
