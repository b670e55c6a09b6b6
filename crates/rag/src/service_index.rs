//! Service catalog index using Tantivy
//!
//! Backs the [`ServiceStore`] trait with a local Tantivy index:
//! - `description` is tokenised (Unicode words, lower-cased, no stemming) so
//!   prefix terms match exactly what the user typed
//! - `name` and `category` are also indexed as single lower-cased raw terms,
//!   which gives case-insensitive substring matching through regex queries
//! - the full record is stored as a JSON payload and validated on read

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::Path;
use tantivy::{
    collector::TopDocs,
    query::{BooleanQuery, Occur, Query, RegexQuery},
    schema::{
        Field, IndexRecordOption, OwnedValue, Schema, TextFieldIndexing, TextOptions, STORED,
        STRING,
    },
    tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer},
    Index, IndexReader, IndexWriter, TantivyDocument, Term,
};

use chat_router_config::{SearchConfig, MIN_WRITER_MEMORY_BYTES};
use chat_router_core::{RecordQuery, ServiceRecord, ServiceStore, StoreError};

use crate::RagError;

const SERVICE_TOKENIZER: &str = "service_text";

/// Index configuration
#[derive(Debug, Clone)]
pub struct ServiceIndexConfig {
    /// Index directory (use RAM if None)
    pub index_path: Option<String>,
    /// Writer heap budget in bytes
    pub writer_memory_bytes: usize,
}

impl Default for ServiceIndexConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            writer_memory_bytes: 50_000_000,
        }
    }
}

impl From<&SearchConfig> for ServiceIndexConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            index_path: config.index_path.clone(),
            writer_memory_bytes: config.writer_memory_bytes,
        }
    }
}

/// Tantivy index over service listings
pub struct ServiceIndex {
    reader: IndexReader,
    writer: RwLock<Option<IndexWriter>>,
    id_field: Field,
    name_field: Field,
    description_field: Field,
    category_field: Field,
    payload_field: Field,
}

impl ServiceIndex {
    /// Open (or create) the index described by `config`
    pub fn new(config: ServiceIndexConfig) -> Result<Self, RagError> {
        if config.writer_memory_bytes < MIN_WRITER_MEMORY_BYTES {
            return Err(RagError::Configuration(format!(
                "writer_memory_bytes must be at least {}",
                MIN_WRITER_MEMORY_BYTES
            )));
        }

        let mut schema_builder = Schema::builder();

        let text_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(SERVICE_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );

        let id_field = schema_builder.add_text_field("id", STRING | STORED);
        let name_field = schema_builder.add_text_field("name", STRING);
        let description_field = schema_builder.add_text_field("description", text_options);
        let category_field = schema_builder.add_text_field("category", STRING);
        let payload_field = schema_builder.add_text_field("payload", STORED);

        let schema = schema_builder.build();

        let index = if let Some(ref path) = config.index_path {
            std::fs::create_dir_all(path).map_err(|e| {
                RagError::Configuration(format!("Cannot create index dir {}: {}", path, e))
            })?;
            let dir = tantivy::directory::MmapDirectory::open(Path::new(path))
                .map_err(|e| RagError::Configuration(e.to_string()))?;
            Index::open_or_create(dir, schema).map_err(|e| RagError::Index(e.to_string()))?
        } else {
            Index::create_in_ram(schema)
        };

        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(64))
            .filter(LowerCaser)
            .build();
        index.tokenizers().register(SERVICE_TOKENIZER, analyzer);

        let reader = index.reader().map_err(|e| RagError::Index(e.to_string()))?;

        let writer = index
            .writer(config.writer_memory_bytes)
            .map_err(|e| RagError::Index(e.to_string()))?;

        tracing::info!(
            path = config.index_path.as_deref().unwrap_or("<ram>"),
            docs = reader.searcher().num_docs(),
            "Service index opened"
        );

        Ok(Self {
            reader,
            writer: RwLock::new(Some(writer)),
            id_field,
            name_field,
            description_field,
            category_field,
            payload_field,
        })
    }

    /// In-RAM index with default settings
    pub fn in_memory() -> Result<Self, RagError> {
        Self::new(ServiceIndexConfig::default())
    }

    /// Add or replace records, keyed by id. Returns how many were indexed.
    pub fn index_records(&self, records: &[ServiceRecord]) -> Result<usize, RagError> {
        let mut writer = self.writer.write();
        let writer = writer
            .as_mut()
            .ok_or_else(|| RagError::Index("Writer not available".to_string()))?;

        for record in records {
            record
                .validate()
                .map_err(|e| RagError::InvalidRecord(e.to_string()))?;

            let payload = serde_json::to_string(record)
                .map_err(|e| RagError::InvalidRecord(e.to_string()))?;

            writer.delete_term(Term::from_field_text(self.id_field, &record.id));

            let mut doc = TantivyDocument::default();
            doc.add_text(self.id_field, &record.id);
            doc.add_text(self.name_field, record.name.to_lowercase());
            doc.add_text(self.description_field, &record.description);
            doc.add_text(self.category_field, record.category.to_lowercase());
            doc.add_text(self.payload_field, &payload);

            writer
                .add_document(doc)
                .map_err(|e| RagError::Index(e.to_string()))?;
        }

        writer
            .commit()
            .map_err(|e| RagError::Index(e.to_string()))?;

        self.reader
            .reload()
            .map_err(|e| RagError::Index(e.to_string()))?;

        Ok(records.len())
    }

    /// Delete records by id
    pub fn delete(&self, ids: &[String]) -> Result<(), RagError> {
        let mut writer = self.writer.write();
        let writer = writer
            .as_mut()
            .ok_or_else(|| RagError::Index("Writer not available".to_string()))?;

        for id in ids {
            writer.delete_term(Term::from_field_text(self.id_field, id));
        }

        writer
            .commit()
            .map_err(|e| RagError::Index(e.to_string()))?;

        self.reader
            .reload()
            .map_err(|e| RagError::Index(e.to_string()))?;

        Ok(())
    }

    /// Number of live records
    pub fn doc_count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Run one record query against the index
    pub fn search(&self, query: &RecordQuery, limit: usize) -> Result<Vec<ServiceRecord>, RagError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(tantivy_query) = self.build_query(query)? else {
            return Ok(Vec::new());
        };

        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&tantivy_query, &TopDocs::with_limit(limit))
            .map_err(|e| RagError::Search(e.to_string()))?;

        let mut records = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| RagError::Search(e.to_string()))?;

            let payload = match doc.get_first(self.payload_field) {
                Some(OwnedValue::Str(s)) => s.as_str(),
                _ => {
                    tracing::warn!(?doc_address, "Indexed service without payload, skipping");
                    continue;
                },
            };

            match decode_record(payload) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable service record");
                },
            }
        }

        Ok(records)
    }

    fn build_query(&self, query: &RecordQuery) -> Result<Option<Box<dyn Query>>, RagError> {
        match query {
            RecordQuery::FullText(expression) => {
                let clauses = expression
                    .terms()
                    .iter()
                    .map(|term| {
                        let pattern = format!("{}.*", regex::escape(&term.to_lowercase()));
                        regex_clause(Occur::Must, &pattern, self.description_field)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(boolean(clauses))
            },
            RecordQuery::NameContainsAny(tokens) => {
                let clauses = tokens
                    .iter()
                    .filter(|t| !t.trim().is_empty())
                    .map(|token| {
                        let pattern = contains_pattern(token);
                        regex_clause(Occur::Should, &pattern, self.name_field)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(boolean(clauses))
            },
            RecordQuery::CategoryContains(text) => {
                if text.trim().is_empty() {
                    return Ok(None);
                }
                let pattern = contains_pattern(text);
                Ok(Some(Box::new(
                    RegexQuery::from_pattern(&pattern, self.category_field)
                        .map_err(|e| RagError::Search(e.to_string()))?,
                )))
            },
        }
    }
}

fn contains_pattern(text: &str) -> String {
    format!(".*{}.*", regex::escape(&text.trim().to_lowercase()))
}

fn regex_clause(
    occur: Occur,
    pattern: &str,
    field: Field,
) -> Result<(Occur, Box<dyn Query>), RagError> {
    let query =
        RegexQuery::from_pattern(pattern, field).map_err(|e| RagError::Search(e.to_string()))?;
    Ok((occur, Box::new(query)))
}

fn boolean(clauses: Vec<(Occur, Box<dyn Query>)>) -> Option<Box<dyn Query>> {
    if clauses.is_empty() {
        None
    } else {
        Some(Box::new(BooleanQuery::new(clauses)))
    }
}

fn decode_record(payload: &str) -> Result<ServiceRecord, RagError> {
    let record: ServiceRecord =
        serde_json::from_str(payload).map_err(|e| RagError::InvalidRecord(e.to_string()))?;
    record
        .validate()
        .map_err(|e| RagError::InvalidRecord(e.to_string()))?;
    Ok(record)
}

#[async_trait]
impl ServiceStore for ServiceIndex {
    async fn query(
        &self,
        query: &RecordQuery,
        limit: usize,
    ) -> Result<Vec<ServiceRecord>, StoreError> {
        self.search(query, limit).map_err(StoreError::from)
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}
