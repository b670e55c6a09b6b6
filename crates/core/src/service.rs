//! Service listing records owned by the structured store

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Contact fields attached to a listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// A service listing
///
/// Read-only for the router. Backends decode raw rows into this type and call
/// [`ServiceRecord::validate`] once, so nothing downstream inspects untyped
/// payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, flatten)]
    pub contact: ContactInfo,
}

impl ServiceRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            price: None,
            location: None,
            rating: None,
            contact: ContactInfo::default(),
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.id.trim().is_empty() {
            return Err(StoreError::InvalidData("service record without id".into()));
        }
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidData(format!(
                "service record {} has an empty name",
                self.id
            )));
        }
        if self.category.trim().is_empty() {
            return Err(StoreError::InvalidData(format!(
                "service record {} has an empty category",
                self.id
            )));
        }
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(StoreError::InvalidData(format!(
                    "service record {} has rating {} outside 0..=5",
                    self.id, rating
                )));
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(StoreError::InvalidData(format!(
                    "service record {} has invalid price {}",
                    self.id, price
                )));
            }
        }
        Ok(())
    }
}
