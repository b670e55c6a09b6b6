//! Router assembly from [`Settings`]
//!
//! Configuration problems (invalid settings, unreadable vocabulary or
//! catalog, missing API key, unreachable ScyllaDB) are reported here, once,
//! at start-up. After that, routing itself never fails. An unreachable
//! completion backend is only a warning since the fallback degrades to an
//! apology.

use std::path::Path;
use std::sync::Arc;

use chat_router_config::{ContextVocabulary, Settings};
use chat_router_llm::create_responder;
use chat_router_rag::{CatalogLoader, RecordSearch, ServiceIndex, ServiceIndexConfig};
use chat_router_text_processing::ContextExtractor;

use crate::{AgentError, QueryRouter};

/// Build a [`QueryRouter`] with every collaborator described by `settings`
pub async fn build_router(settings: &Settings) -> Result<QueryRouter, AgentError> {
    settings.validate()?;

    let vocabulary = match settings.vocabulary_path.as_deref() {
        Some(path) => ContextVocabulary::from_yaml_file(path)?,
        None => ContextVocabulary::default(),
    };
    let extractor = ContextExtractor::new(vocabulary);

    let index = ServiceIndex::new(ServiceIndexConfig::from(&settings.search))?;
    if let Some(catalog) = settings.search.catalog_path.as_deref() {
        CatalogLoader::load_into(Path::new(catalog), &index)?;
    }
    let search = RecordSearch::with_limit(Arc::new(index), settings.search.limit);

    let persistence = chat_router_persistence::init(&settings.persistence).await?;
    let responder = create_responder(&settings.llm)?;
    let llm_available = responder.is_available().await;
    if !llm_available {
        tracing::warn!(
            model = %responder.model_name(),
            endpoint = %settings.llm.endpoint,
            "Completion backend not reachable, fallback answers will be apologies until it is"
        );
    }

    tracing::info!(
        environment = ?settings.environment,
        search_limit = search.limit(),
        model = %responder.model_name(),
        llm_available,
        persistence = settings.persistence.enabled,
        "Query router ready"
    );

    Ok(QueryRouter::new(
        extractor,
        search,
        persistence.sessions.clone(),
        responder,
        persistence.logger(),
    )
    .with_config(settings.router.clone()))
}
