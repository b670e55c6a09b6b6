//! Service catalog loading
//!
//! Reads listings from a YAML or JSON file (a list of records, or a map with a
//! `services` list) and feeds them into a [`ServiceIndex`]. Invalid entries
//! are logged and skipped so one bad row does not block start-up.

use serde::{Deserialize, Serialize};
use std::path::Path;

use chat_router_core::ServiceRecord;

use crate::{RagError, ServiceIndex};

/// Catalog file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogFile {
    Wrapped { services: Vec<ServiceRecord> },
    List(Vec<ServiceRecord>),
}

impl CatalogFile {
    fn into_records(self) -> Vec<ServiceRecord> {
        match self {
            CatalogFile::Wrapped { services } => services,
            CatalogFile::List(records) => records,
        }
    }
}

/// Catalog loader
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parse and validate a catalog file
    pub fn load(path: &Path) -> Result<Vec<ServiceRecord>, RagError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RagError::Catalog(format!("Failed to read {}: {}", path.display(), e)))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let catalog: CatalogFile = match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| RagError::Catalog(format!("JSON parse error: {}", e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| RagError::Catalog(format!("YAML parse error: {}", e)))?,
            _ => {
                return Err(RagError::Catalog(format!(
                    "Unsupported file type: {}",
                    extension
                )))
            },
        };

        let mut records = Vec::new();
        for record in catalog.into_records() {
            match record.validate() {
                Ok(()) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        file = %path.display(),
                        id = %record.id,
                        error = %e,
                        "Skipping invalid catalog entry"
                    );
                },
            }
        }

        Ok(records)
    }

    /// Load a catalog file into `index`. Returns the number of records indexed.
    pub fn load_into(path: &Path, index: &ServiceIndex) -> Result<usize, RagError> {
        let records = Self::load(path)?;
        let count = index.index_records(&records)?;

        tracing::info!(
            file = %path.display(),
            records = count,
            total = index.doc_count(),
            "Service catalog loaded"
        );

        Ok(count)
    }
}
