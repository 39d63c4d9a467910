//! Integration tests for doc-translator-core
//!
//! These tests verify the end-to-end pipeline:
//! - Same-language and empty-chunk short-circuits
//! - Cache hits, order preservation and pacing
//! - Graceful degradation on per-chunk failures
//! - Admission control and the availability gate
//! - Retry/backoff shape under rate limiting

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use doc_translator_core::{
    AppConfig, CacheConfig, ChunkTranslator, DocTranslator, DocumentTranslation,
    DocumentTranslationOrchestrator, Error, Lang, MemoryDocumentStore, OutputFormat, PacingPolicy,
    ProviderTranslation, Result, Sleeper, TranslationCache, TranslationProfile,
    TranslationProvider, TranslationResponse,
    provider::ProviderInfo,
};

// =============================================================================
// Mock Providers
// =============================================================================

/// A mock provider backed by a fixed translation table.
///
/// Unknown inputs are "translated" by appending the target language tag,
/// so the canary probe always sees changed text. Counts every call and
/// can be configured to fail for one specific input.
struct TableProvider {
    table: HashMap<String, String>,
    fail_for: Option<String>,
    calls: AtomicUsize,
}

impl TableProvider {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            table: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            fail_for: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_on(pairs: &[(&str, &str)], fail_for: &str) -> Self {
        Self {
            fail_for: Some(fail_for.to_string()),
            ..Self::new(pairs)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for TableProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "table",
            requires_api_key: false,
            supports_auto_detect: false,
        }
    }

    async fn translate(
        &self,
        text: &str,
        _source: &Lang,
        target: &Lang,
    ) -> Result<ProviderTranslation> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_for.as_deref() == Some(text) {
            return Err(Error::ProviderRequest("mock provider failure".to_string()));
        }

        let translated = self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{text} ({target})"));

        Ok(ProviderTranslation {
            text: translated,
            detected_source_lang: None,
        })
    }
}

/// A mock provider that always fails with a generic error.
struct FailingProvider {
    calls: AtomicUsize,
}

impl FailingProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for FailingProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "failing",
            requires_api_key: false,
            supports_auto_detect: false,
        }
    }

    async fn translate(
        &self,
        _text: &str,
        _source: &Lang,
        _target: &Lang,
    ) -> Result<ProviderTranslation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::ProviderRequest("mock provider down".to_string()))
    }
}

/// Scripted reply for [`ScriptedProvider`].
enum Step {
    RateLimited,
    Ok(&'static str),
}

/// A mock provider that replays a fixed script of outcomes.
struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "scripted",
            requires_api_key: false,
            supports_auto_detect: false,
        }
    }

    async fn translate(
        &self,
        _text: &str,
        _source: &Lang,
        _target: &Lang,
    ) -> Result<ProviderTranslation> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // An exhausted script keeps rate-limiting
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::RateLimited);
        match step {
            Step::RateLimited => Err(Error::ProviderRateLimited { retry_after: None }),
            Step::Ok(text) => Ok(ProviderTranslation {
                text: text.to_string(),
                detected_source_lang: None,
            }),
        }
    }
}

// =============================================================================
// Recording Sleeper
// =============================================================================

/// Records requested delays instead of waiting, so tests measure pacing
/// and backoff without wall-clock time.
#[derive(Default)]
struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

const SPANISH_TABLE: &[(&str, &str)] = &[
    ("Hello.", "Hola."),
    ("World.", "Mundo."),
    ("Bye.", "Adiós."),
    ("hello", "hola"),
];

fn es() -> Lang {
    Lang::new("es")
}

fn test_profile(max_chunks: usize) -> TranslationProfile {
    TranslationProfile {
        name: "test",
        max_chunks,
        retry_base_delay: Duration::from_secs(2),
        pacing: PacingPolicy::new(Duration::from_millis(100), Duration::from_secs(2)),
    }
}

struct Harness {
    store: Arc<MemoryDocumentStore>,
    cache: Arc<TranslationCache>,
    sleeper: Arc<RecordingSleeper>,
    orchestrator: DocumentTranslationOrchestrator,
}

fn harness(provider: Arc<dyn TranslationProvider>, profile: TranslationProfile) -> Harness {
    let store = Arc::new(MemoryDocumentStore::new());
    let cache = Arc::new(TranslationCache::new(&CacheConfig::default()));
    let sleeper = Arc::new(RecordingSleeper::default());

    let orchestrator = DocumentTranslationOrchestrator::new(
        store.clone(),
        provider,
        Arc::clone(&cache),
        sleeper.clone(),
        profile,
    );

    Harness {
        store,
        cache,
        sleeper,
        orchestrator,
    }
}

fn notes_document(store: &MemoryDocumentStore, language: &str) -> String {
    store.insert_document(
        "notes.txt",
        Lang::new(language),
        vec!["Hello.".to_string(), "World.".to_string(), "Bye.".to_string()],
    )
}

fn expect_complete(result: DocumentTranslation) -> doc_translator_core::TranslatedDocument {
    match result {
        DocumentTranslation::Complete(doc) => doc,
        other => panic!("expected complete translation, got {other:?}"),
    }
}

// =============================================================================
// Short-Circuit Tests
// =============================================================================

#[tokio::test]
async fn test_same_language_skips_translation_entirely() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let h = harness(provider.clone(), test_profile(100));
    let id = notes_document(&h.store, "es");

    let doc = expect_complete(h.orchestrator.translate_document(&id, &es()).await.unwrap());

    assert_eq!(doc.body, "Hello.\n\nWorld.\n\nBye.");
    assert_eq!(doc.chunk_count, 3);
    assert_eq!(doc.failed_chunks, 0);
    assert_eq!(provider.calls(), 0, "no provider call may occur");
    assert!(h.sleeper.slept().is_empty(), "no pacing for skipped documents");
}

#[tokio::test]
async fn test_chunk_translator_no_op_for_same_language_and_blank_text() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let cache = Arc::new(TranslationCache::new(&CacheConfig::default()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let translator = ChunkTranslator::new(
        provider.clone(),
        Arc::clone(&cache),
        sleeper,
        Duration::from_secs(2),
    );

    let outcome = translator.translate_chunk("Hello.", &es(), &es()).await;
    assert_eq!(outcome.text, "Hello.");
    assert!(outcome.succeeded);
    assert_eq!(outcome.attempts, 0);

    let outcome = translator.translate_chunk("   ", &Lang::new("en"), &es()).await;
    assert_eq!(outcome.text, "   ");
    assert_eq!(outcome.attempts, 0);

    assert_eq!(provider.calls(), 0);
    // The cache is not consulted either
    assert_eq!(cache.stats().misses, 0);
}

#[tokio::test]
async fn test_empty_document_is_no_content() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let h = harness(provider, test_profile(100));
    let id = h.store.insert_document("empty.txt", Lang::new("en"), vec![]);

    let result = h.orchestrator.translate_document(&id, &es()).await.unwrap();
    assert!(matches!(result, DocumentTranslation::NoContent));
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let h = harness(provider, test_profile(100));

    let err = h
        .orchestrator
        .translate_document("no-such-doc", &es())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DocumentNotFound(_)));
}

// =============================================================================
// Order Preservation & Pacing
// =============================================================================

#[tokio::test]
async fn test_order_preserved_regardless_of_cache_hits() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let h = harness(provider.clone(), test_profile(100));
    let id = notes_document(&h.store, "en");

    // Pre-seed the middle chunk so it is served from cache
    h.cache.store("World.", "Mundo.", &Lang::new("en"), &es());

    let doc = expect_complete(h.orchestrator.translate_document(&id, &es()).await.unwrap());

    assert_eq!(doc.body, "Hola.\n\nMundo.\n\nAdiós.");

    // Pacing: canary succeeded without sleeping, then a provider delay
    // after chunk 0, a short cache-hit delay after chunk 1, and nothing
    // after the final chunk
    assert_eq!(
        h.sleeper.slept(),
        vec![Duration::from_secs(2), Duration::from_millis(100)]
    );
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let h = harness(provider.clone(), test_profile(100));
    let id = notes_document(&h.store, "en");

    let first = expect_complete(h.orchestrator.translate_document(&id, &es()).await.unwrap());
    let calls_after_first = provider.calls();

    let second = expect_complete(h.orchestrator.translate_document(&id, &es()).await.unwrap());

    assert_eq!(first.body, second.body);
    assert_eq!(
        provider.calls(),
        calls_after_first,
        "second run must not call the provider at all, canary included"
    );
    assert!(h.cache.stats().hits >= 4);
}

// =============================================================================
// Graceful Degradation
// =============================================================================

#[tokio::test]
async fn test_single_chunk_failure_degrades_not_aborts() {
    let provider = Arc::new(TableProvider::failing_on(SPANISH_TABLE, "World."));
    let h = harness(provider, test_profile(100));
    let id = notes_document(&h.store, "en");

    let doc = expect_complete(h.orchestrator.translate_document(&id, &es()).await.unwrap());

    // The failed middle chunk keeps its original text; neighbors translate
    assert_eq!(doc.body, "Hola.\n\nWorld.\n\nAdiós.");
    assert_eq!(doc.chunk_count, 3);
    assert_eq!(doc.failed_chunks, 1);
}

// =============================================================================
// Admission Control
// =============================================================================

#[tokio::test]
async fn test_document_at_ceiling_is_admitted() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let h = harness(provider, test_profile(3));
    let id = notes_document(&h.store, "en");

    let doc = expect_complete(h.orchestrator.translate_document(&id, &es()).await.unwrap());
    assert_eq!(doc.chunk_count, 3);
}

#[tokio::test]
async fn test_document_over_ceiling_is_rejected_without_provider_calls() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let h = harness(provider.clone(), test_profile(3));
    let id = h.store.insert_document(
        "big.txt",
        Lang::new("en"),
        (0..4).map(|i| format!("Paragraph {i}.")).collect(),
    );

    let result = h.orchestrator.translate_document(&id, &es()).await.unwrap();
    let DocumentTranslation::TooLarge(rejection) = result else {
        panic!("expected too-large rejection");
    };

    assert_eq!(rejection.chunk_count, 4);
    assert_eq!(rejection.max_chunks, 3);
    assert_eq!(rejection.estimated_secs, 12);
    assert_eq!(rejection.suggested_max_chunks, 3);
    assert_eq!(rejection.fallback.document_id, id);
    assert_eq!(provider.calls(), 0, "rejection must precede any provider work");
}

// =============================================================================
// Availability Gate
// =============================================================================

#[tokio::test]
async fn test_unavailable_provider_aborts_before_chunk_work() {
    let provider = Arc::new(FailingProvider::new());
    let h = harness(provider.clone(), test_profile(100));
    let id = notes_document(&h.store, "en");

    let result = h.orchestrator.translate_document(&id, &es()).await.unwrap();
    let DocumentTranslation::Unavailable(notice) = result else {
        panic!("expected unavailable notice");
    };

    assert_eq!(notice.retry_after_secs, 60);
    assert_eq!(notice.fallback.document_id, id);
    assert!(!notice.alternatives.is_empty());
    // Only the canary reached the provider; zero chunk-level calls
    assert_eq!(provider.calls(), 1);
}

// =============================================================================
// Retry / Backoff Shape
// =============================================================================

#[tokio::test]
async fn test_exhausted_rate_limit_retries_fall_back_to_original() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Step::RateLimited,
        Step::RateLimited,
        Step::RateLimited,
    ]));
    let cache = Arc::new(TranslationCache::new(&CacheConfig::default()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let translator = ChunkTranslator::new(
        provider.clone(),
        cache,
        sleeper.clone(),
        Duration::from_secs(2),
    );

    let outcome = translator
        .translate_chunk("Hello.", &Lang::new("en"), &es())
        .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.text, "Hello.", "fallback is the original text");
    assert_eq!(outcome.attempts, 3);
    assert_eq!(provider.calls(), 3);
    // Backoff shape: attempt_number x base between attempts
    assert_eq!(
        sleeper.slept(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
}

#[tokio::test]
async fn test_rate_limit_recovery_on_final_attempt() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Step::RateLimited,
        Step::RateLimited,
        Step::Ok("Hola."),
    ]));
    let cache = Arc::new(TranslationCache::new(&CacheConfig::default()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let translator = ChunkTranslator::new(
        provider.clone(),
        Arc::clone(&cache),
        sleeper,
        Duration::from_secs(3),
    );

    let outcome = translator
        .translate_chunk("Hello.", &Lang::new("en"), &es())
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.text, "Hola.");
    assert_eq!(outcome.attempts, 3);
    // The hard-won translation is cached for next time
    assert_eq!(
        cache.lookup("Hello.", &Lang::new("en"), &es()),
        Some("Hola.".to_string())
    );
}

#[tokio::test]
async fn test_generic_failure_is_not_retried() {
    let provider = Arc::new(FailingProvider::new());
    let cache = Arc::new(TranslationCache::new(&CacheConfig::default()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let translator = ChunkTranslator::new(
        provider.clone(),
        cache,
        sleeper.clone(),
        Duration::from_secs(2),
    );

    let outcome = translator
        .translate_chunk("Hello.", &Lang::new("en"), &es())
        .await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(provider.calls(), 1);
    assert!(sleeper.slept().is_empty());
}

// =============================================================================
// End-to-End
// =============================================================================

#[tokio::test]
async fn test_end_to_end_spanish_document() {
    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let h = harness(provider, test_profile(100));
    let id = notes_document(&h.store, "en");

    let doc = expect_complete(h.orchestrator.translate_document(&id, &es()).await.unwrap());

    assert_eq!(doc.body, "Hola.\n\nMundo.\n\nAdiós.");
    assert_eq!(doc.chunk_count, 3);
    assert_eq!(doc.failed_chunks, 0);
    assert_eq!(doc.source_lang().as_str(), "en");
    assert_eq!(doc.target_lang.as_str(), "es");
    assert_eq!(doc.byte_len(), doc.body.len());
    assert_eq!(doc.output_filename(OutputFormat::PlainText), "notes_Spanish.txt");
    assert_eq!(doc.output_filename(OutputFormat::Pdf), "notes_Spanish.pdf");
}

#[tokio::test]
async fn test_facade_translate_and_render_json() {
    let store = Arc::new(MemoryDocumentStore::new());
    let id = notes_document(&store, "en");

    // Tiny pacing so the facade's real sleeper does not slow the test
    let mut config = AppConfig::default();
    config.pacing.cache_hit_ms = 1;
    config.pacing.bulk_provider_ms = 1;
    config.pacing.bulk_retry_base_ms = 1;

    let provider = Arc::new(TableProvider::new(SPANISH_TABLE));
    let profile = TranslationProfile::bulk(&config);
    let translator = DocTranslator::with_provider(provider, config, store);

    let response = translator
        .translate_and_render(&id, &es(), OutputFormat::Json, profile)
        .await
        .unwrap();

    let TranslationResponse::Rendered(rendered) = response else {
        panic!("expected rendered document");
    };

    assert_eq!(rendered.filename, "notes_Spanish.json");
    assert_eq!(rendered.content_type, "application/json");
    assert_eq!(rendered.chunk_count, 3);
    assert_eq!(rendered.failed_chunks, 0);

    let value: serde_json::Value = serde_json::from_slice(&rendered.bytes).unwrap();
    assert_eq!(value["content"], "Hola.\n\nMundo.\n\nAdiós.");
    assert_eq!(value["title"], "notes.txt");

    assert!(translator.cache_stats().size >= 3);
}
