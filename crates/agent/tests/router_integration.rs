//! End-to-end routing tests with in-process fakes for every collaborator

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use chat_router_agent::{
    QueryRouter, CLARIFY_BOTH, CLARIFY_LOCATION, CLARIFY_SERVICE_TYPE, ERROR_APOLOGY,
    FALLBACK_APOLOGY,
};
use chat_router_config::RouterConfig;
use chat_router_core::{
    ContextUpdate, InteractionLog, InteractionLogEntry, Message, RecordQuery, Role, RouteSource,
    ServiceRecord, ServiceStore, SessionContext, SessionContextStore, StoreError,
};
use chat_router_llm::{FallbackResponder, FinishReason, GenerationResult, LlmBackend, LlmError};
use chat_router_persistence::{InMemoryInteractionLog, InMemorySessionStore, InteractionLogger};
use chat_router_rag::RecordSearch;
use chat_router_text_processing::ContextExtractor;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

enum StoreBehavior {
    /// Records per query kind ("full_text", "keyword", "category")
    Tiers(HashMap<&'static str, Vec<ServiceRecord>>),
    Fail(fn() -> StoreError),
    Panic,
}

struct ScriptedStore {
    behavior: StoreBehavior,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedStore {
    fn empty() -> Self {
        Self::tiers(HashMap::new())
    }

    fn tiers(tiers: HashMap<&'static str, Vec<ServiceRecord>>) -> Self {
        Self {
            behavior: StoreBehavior::Tiers(tiers),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: fn() -> StoreError) -> Self {
        Self {
            behavior: StoreBehavior::Fail(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn panicking() -> Self {
        Self {
            behavior: StoreBehavior::Panic,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ServiceStore for ScriptedStore {
    async fn query(
        &self,
        query: &RecordQuery,
        limit: usize,
    ) -> Result<Vec<ServiceRecord>, StoreError> {
        self.calls.lock().push(query.kind());
        match &self.behavior {
            StoreBehavior::Tiers(tiers) => Ok(tiers
                .get(query.kind())
                .map(|records| records.iter().take(limit).cloned().collect())
                .unwrap_or_default()),
            StoreBehavior::Fail(make) => Err(make()),
            StoreBehavior::Panic => panic!("store exploded"),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct CountingBackend {
    reply: Option<String>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl CountingBackend {
    fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn broken() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for CountingBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(messages.to_vec());
        match &self.reply {
            Some(text) => Ok(GenerationResult {
                text: text.clone(),
                tokens: 8,
                total_time_ms: 5,
                finish_reason: FinishReason::Stop,
            }),
            None => Err(LlmError::Network("connection refused".to_string())),
        }
    }

    async fn is_available(&self) -> bool {
        self.reply.is_some()
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}

struct BrokenSessionStore;

#[async_trait]
impl SessionContextStore for BrokenSessionStore {
    async fn get(&self, _session_id: &str) -> Result<Option<SessionContext>, StoreError> {
        Err(StoreError::Connection("sessions unavailable".to_string()))
    }

    async fn merge(
        &self,
        _session_id: &str,
        _update: &ContextUpdate,
    ) -> Result<SessionContext, StoreError> {
        Err(StoreError::Connection("sessions unavailable".to_string()))
    }
}

struct BrokenLog {
    attempts: AtomicUsize,
}

#[async_trait]
impl InteractionLog for BrokenLog {
    async fn append(&self, _entry: &InteractionLogEntry) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Query("chat_logs write timed out".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

const GENERATED: &str = "A licensed HVAC technician usually charges around AED 150 for a check.";

struct Harness {
    router: QueryRouter,
    store: Arc<ScriptedStore>,
    backend: Arc<CountingBackend>,
    sessions: Arc<InMemorySessionStore>,
    log: Arc<InMemoryInteractionLog>,
}

impl Harness {
    fn new(store: ScriptedStore) -> Self {
        Self::with_backend(store, CountingBackend::replying(GENERATED))
    }

    fn with_backend(store: ScriptedStore, backend: CountingBackend) -> Self {
        let store = Arc::new(store);
        let backend = Arc::new(backend);
        let sessions = Arc::new(InMemorySessionStore::new());
        let log = Arc::new(InMemoryInteractionLog::new());

        let router = QueryRouter::new(
            ContextExtractor::default(),
            RecordSearch::new(store.clone()),
            sessions.clone(),
            FallbackResponder::new(backend.clone()),
            InteractionLogger::new(log.clone()),
        );

        Self {
            router,
            store,
            backend,
            sessions,
            log,
        }
    }
}

fn plumbers() -> Vec<ServiceRecord> {
    vec![
        ServiceRecord::new(
            "p1",
            "Reem Plumbing Co",
            "Leak repair, drain cleaning and water heater installation",
            "plumbing",
        )
        .with_price(150.0)
        .with_location("Al Reem Island")
        .with_rating(4.7),
        ServiceRecord::new("p2", "Capital Pipe Masters", "24/7 emergency plumber", "plumbing")
            .with_location("Al Reem Island")
            .with_rating(4.1),
    ]
}

fn category_only(records: Vec<ServiceRecord>) -> ScriptedStore {
    ScriptedStore::tiers(HashMap::from([("category", records)]))
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_plumber_in_al_reem_answers_from_records() {
    let h = Harness::new(ScriptedStore::tiers(HashMap::from([(
        "full_text",
        plumbers(),
    )])));

    let response = h.router.route("I need a plumber in Al Reem", &[], None).await;

    assert_eq!(response.source, RouteSource::Records);
    assert_eq!(response.message.role, Role::Assistant);
    let text = response.text();
    assert!(text.contains('2'));
    let first = text.find("Reem Plumbing Co").unwrap();
    let second = text.find("Capital Pipe Masters").unwrap();
    assert!(first < second);
    assert_eq!(response.records.as_ref().map(Vec::len), Some(2));

    assert_eq!(h.store.calls(), vec!["full_text"]);
    assert_eq!(h.backend.calls(), 0);
}

#[tokio::test]
async fn test_greeting_asks_for_service_and_area() {
    let h = Harness::new(ScriptedStore::empty());

    let response = h.router.route("hello", &[], None).await;

    assert_eq!(response.source, RouteSource::Clarify);
    assert_eq!(response.text(), CLARIFY_BOTH);
    assert!(response.records.is_none());
    assert_eq!(h.backend.calls(), 0);
}

#[tokio::test]
async fn test_location_from_session_and_type_from_message_reach_fallback() {
    let h = Harness::new(ScriptedStore::empty());
    h.sessions
        .merge("s1", &ContextUpdate::default().with_location("yas island"))
        .await
        .unwrap();

    let response = h.router.route("need ac repair", &[], Some("s1")).await;

    assert_eq!(response.source, RouteSource::Fallback);
    assert_eq!(response.text(), GENERATED);
    assert_eq!(h.backend.calls(), 1);

    let stored = h.sessions.get("s1").await.unwrap().unwrap();
    assert_eq!(stored.location.as_deref(), Some("yas island"));
    assert_eq!(stored.service_type.as_deref(), Some("ac repair"));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_category_tier_result_is_returned_unchanged() {
    let records = plumbers();
    let h = Harness::new(category_only(records.clone()));

    let response = h.router.route("plumbing", &[], None).await;

    assert_eq!(response.source, RouteSource::Records);
    assert_eq!(response.records, Some(records));
    assert_eq!(h.store.calls(), vec!["full_text", "keyword", "category"]);
}

#[tokio::test]
async fn test_stored_location_survives_turns_without_one() {
    let h = Harness::new(ScriptedStore::empty());

    h.router
        .route("I need a plumber in Al Reem", &[], Some("s1"))
        .await;
    let response = h
        .router
        .route("what about tomorrow morning", &[], Some("s1"))
        .await;

    let stored = h.sessions.get("s1").await.unwrap().unwrap();
    assert_eq!(stored.location.as_deref(), Some("al reem"));
    assert_eq!(stored.service_type.as_deref(), Some("plumbing"));
    // Both signals come from the session on the second turn
    assert_eq!(response.source, RouteSource::Fallback);
}

#[tokio::test]
async fn test_clarifying_questions_are_distinct() {
    let h = Harness::new(ScriptedStore::empty());

    let both = h.router.route("hello", &[], None).await;
    let location = h.router.route("need a plumber", &[], None).await;
    let service_type = h.router.route("anything on yas island", &[], None).await;

    for response in [&both, &location, &service_type] {
        assert_eq!(response.source, RouteSource::Clarify);
    }
    assert_eq!(both.text(), CLARIFY_BOTH);
    assert_eq!(location.text(), CLARIFY_LOCATION);
    assert_eq!(service_type.text(), CLARIFY_SERVICE_TYPE);
    assert_ne!(both.text(), location.text());
    assert_ne!(location.text(), service_type.text());
    assert_ne!(both.text(), service_type.text());
    assert_eq!(h.backend.calls(), 0);
}

#[tokio::test]
async fn test_complete_context_without_records_calls_backend_once() {
    let h = Harness::new(ScriptedStore::empty());

    let response = h.router.route("fix my ac in al reem", &[], None).await;

    assert_eq!(response.source, RouteSource::Fallback);
    assert_eq!(h.backend.calls(), 1);
}

#[tokio::test]
async fn test_plural_service_keyword_completes_context() {
    let h = Harness::new(ScriptedStore::empty());

    let response = h.router.route("need electricians in al reem", &[], None).await;

    assert_eq!(response.source, RouteSource::Fallback);
    assert_eq!(h.backend.calls(), 1);
}

#[tokio::test]
async fn test_every_branch_logs_exactly_once() {
    let cases: Vec<(ScriptedStore, &str, RouteSource)> = vec![
        (
            ScriptedStore::tiers(HashMap::from([("full_text", plumbers())])),
            "I need a plumber in Al Reem",
            RouteSource::Records,
        ),
        (ScriptedStore::empty(), "hello", RouteSource::Clarify),
        (
            ScriptedStore::empty(),
            "fix my ac in al reem",
            RouteSource::Fallback,
        ),
        (
            ScriptedStore::failing(|| StoreError::Connection("refused".to_string())),
            "fix my ac in al reem",
            RouteSource::Error,
        ),
        (ScriptedStore::panicking(), "plumber", RouteSource::Error),
    ];

    for (store, message, expected) in cases {
        let h = Harness::new(store);
        let response = h.router.route(message, &[], Some("s1")).await;
        assert_eq!(response.source, expected, "{message}");

        let entries = h.log.entries();
        assert_eq!(entries.len(), 1, "{message}");
        assert_eq!(entries[0].source, response.source);
        assert_eq!(entries[0].query, message);
        assert_eq!(entries[0].response, response.text());
        assert_eq!(entries[0].actor_id, "s1");
    }
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fatal_store_error_becomes_error_response() {
    let h = Harness::new(ScriptedStore::failing(|| {
        StoreError::Configuration("missing connection".to_string())
    }));

    let response = h.router.route("I need a plumber in Al Reem", &[], None).await;

    assert_eq!(response.source, RouteSource::Error);
    assert_eq!(response.text(), ERROR_APOLOGY);
    assert!(response.records.is_none());
    assert_eq!(h.backend.calls(), 0);
}

#[tokio::test]
async fn test_store_panic_becomes_error_response() {
    let h = Harness::new(ScriptedStore::panicking());

    let response = h.router.route("plumber", &[], None).await;

    assert_eq!(response.source, RouteSource::Error);
    assert_eq!(response.text(), ERROR_APOLOGY);
    assert_eq!(h.log.entries().len(), 1);
}

#[tokio::test]
async fn test_failing_tiers_are_treated_as_empty() {
    let h = Harness::new(ScriptedStore::failing(|| {
        StoreError::Query("syntax error in tsquery".to_string())
    }));

    let response = h.router.route("need a plumber", &[], None).await;

    assert_eq!(response.source, RouteSource::Clarify);
    assert_eq!(response.text(), CLARIFY_LOCATION);
    assert_eq!(h.store.calls().len(), 3);
}

#[tokio::test]
async fn test_session_store_outage_does_not_block_answer() {
    let store = Arc::new(ScriptedStore::empty());
    let backend = Arc::new(CountingBackend::replying(GENERATED));
    let log = Arc::new(InMemoryInteractionLog::new());
    let router = QueryRouter::new(
        ContextExtractor::default(),
        RecordSearch::new(store),
        Arc::new(BrokenSessionStore),
        FallbackResponder::new(backend.clone()),
        InteractionLogger::new(log.clone()),
    );

    let response = router.route("fix my ac in al reem", &[], Some("s1")).await;

    assert_eq!(response.source, RouteSource::Fallback);
    assert_eq!(backend.calls(), 1);
    assert_eq!(log.entries().len(), 1);
}

#[tokio::test]
async fn test_log_failure_keeps_response() {
    let sink = Arc::new(BrokenLog {
        attempts: AtomicUsize::new(0),
    });
    let router = QueryRouter::new(
        ContextExtractor::default(),
        RecordSearch::new(Arc::new(ScriptedStore::tiers(HashMap::from([(
            "full_text",
            plumbers(),
        )])))),
        Arc::new(InMemorySessionStore::new()),
        FallbackResponder::new(Arc::new(CountingBackend::replying(GENERATED))),
        InteractionLogger::new(sink.clone()),
    );

    let response = router.route("I need a plumber in Al Reem", &[], None).await;

    assert_eq!(response.source, RouteSource::Records);
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_backend_failure_returns_apology_as_fallback() {
    let h = Harness::with_backend(ScriptedStore::empty(), CountingBackend::broken());

    let response = h.router.route("fix my ac in al reem", &[], None).await;

    assert_eq!(response.source, RouteSource::Fallback);
    assert_eq!(response.text(), FALLBACK_APOLOGY);
    assert_eq!(h.backend.calls(), 1);
}

// ---------------------------------------------------------------------------
// Details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fallback_history_is_truncated() {
    let h = Harness::new(ScriptedStore::empty());
    let router = h.router.clone().with_config(RouterConfig {
        max_history_turns: 2,
        ..RouterConfig::default()
    });

    let history: Vec<Message> = (0..6)
        .map(|i| {
            if i % 2 == 0 {
                Message::user(format!("turn {}", i))
            } else {
                Message::assistant(format!("reply {}", i))
            }
        })
        .collect();

    let response = router.route("fix my ac in al reem", &history, None).await;
    assert_eq!(response.source, RouteSource::Fallback);

    let seen = h.backend.seen.lock();
    let sent = &seen[0];
    // system prompt + two history turns + current message
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0].role, Role::System);
    assert_eq!(sent[1].content, "turn 4");
    assert_eq!(sent[2].content, "reply 5");
    assert_eq!(sent[3].content, "fix my ac in al reem");
}

#[tokio::test]
async fn test_location_from_history_completes_context() {
    let h = Harness::new(ScriptedStore::empty());
    let history = vec![
        Message::user("hi, I'm in khalifa city"),
        Message::assistant(CLARIFY_SERVICE_TYPE),
    ];

    let response = h.router.route("need a plumber", &history, None).await;

    assert_eq!(response.source, RouteSource::Fallback);
}

#[tokio::test]
async fn test_calls_without_session_log_anonymous_actor() {
    let h = Harness::new(ScriptedStore::empty());

    h.router.route("hello", &[], None).await;
    h.router.route("hello", &[], Some("   ")).await;

    let entries = h.log.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.actor_id == "anonymous"));
    assert!(h.sessions.is_empty());
}
