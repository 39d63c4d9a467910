//! Doc Translator Core Library
//!
//! This library provides the core functionality for translating chunked
//! documents of arbitrary length through an unreliable, rate-limited
//! translation provider:
//! - Content-addressed translation caching with hit/miss accounting
//! - Per-chunk translation with retry/backoff and graceful degradation
//! - A canary rate probe run before committing to a long batch
//! - A sequential, paced document orchestrator with admission control
//! - Rendering of the reassembled document into caller-selected formats

pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod store;

pub use cache::{CacheKey, CacheStats, TranslationCache};
pub use config::{AppConfig, CacheConfig, Lang, LimitsConfig, PacingConfig, ProviderConfig, language_name};
pub use error::{Error, Result};
pub use pipeline::{
    AdmissionRejection, ChunkOutcome, ChunkTranslator, DocumentTranslation,
    DocumentTranslationOrchestrator, FallbackDownload, PacingPolicy, ProgressCallback, RateProbe,
    Sleeper, TokioSleeper, TranslatedDocument, TranslationProfile, UnavailableNotice,
};
pub use provider::{OpenAiProvider, ProviderTranslation, TranslationProvider, create_provider};
pub use render::{DocumentRenderer, OutputFormat, TextRenderer};
pub use store::{Chunk, DocumentMetadata, DocumentStatus, DocumentStore, MemoryDocumentStore};

use std::sync::Arc;

/// A rendered translation ready to hand to the caller.
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    /// Derived filename, e.g. `notes_Spanish.txt`
    pub filename: String,
    pub content_type: &'static str,
    pub chunk_count: usize,
    pub failed_chunks: usize,
    pub source_lang: Lang,
    pub target_lang: Lang,
}

/// Boundary result of translate-and-render: either rendered bytes or a
/// structured rejection the caller can act on.
pub enum TranslationResponse {
    Rendered(RenderedDocument),
    NoContent,
    TooLarge(AdmissionRejection),
    Unavailable(UnavailableNotice),
}

/// High-level document translator that combines all components.
pub struct DocTranslator {
    provider: Arc<dyn TranslationProvider>,
    cache: Arc<TranslationCache>,
    store: Arc<dyn DocumentStore>,
    renderer: Arc<dyn DocumentRenderer>,
    config: AppConfig,
}

impl DocTranslator {
    /// Create a new document translator with the given configuration
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let provider = create_provider(&config.provider)?;
        let cache = Arc::new(TranslationCache::new(&config.cache));

        Ok(Self {
            provider,
            cache,
            store,
            renderer: Arc::new(TextRenderer),
            config,
        })
    }

    /// Create with a custom provider (used by tests and alternate backends)
    pub fn with_provider(
        provider: Arc<dyn TranslationProvider>,
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let cache = Arc::new(TranslationCache::new(&config.cache));

        Self {
            provider,
            cache,
            store,
            renderer: Arc::new(TextRenderer),
            config,
        }
    }

    /// Start the periodic cache eviction sweep. Requires a tokio runtime.
    pub fn start_cache_sweeper(&self) -> tokio::task::JoinHandle<()> {
        Arc::clone(&self.cache).spawn_sweeper()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    fn orchestrator(&self, profile: TranslationProfile) -> DocumentTranslationOrchestrator {
        DocumentTranslationOrchestrator::new(
            Arc::clone(&self.store),
            Arc::clone(&self.provider),
            Arc::clone(&self.cache),
            Arc::new(TokioSleeper),
            profile,
        )
    }

    /// Translate a whole document on the given profile.
    pub async fn translate_document(
        &self,
        document_id: &str,
        target: &Lang,
        profile: TranslationProfile,
    ) -> Result<DocumentTranslation> {
        self.orchestrator(profile)
            .translate_document(document_id, target)
            .await
    }

    /// Translate a whole document, reporting per-chunk progress.
    pub async fn translate_document_with_progress(
        &self,
        document_id: &str,
        target: &Lang,
        profile: TranslationProfile,
        progress: ProgressCallback,
    ) -> Result<DocumentTranslation> {
        self.orchestrator(profile)
            .translate_document_with_progress(document_id, target, Some(progress))
            .await
    }

    /// Translate a document and render the result in the requested format.
    pub async fn translate_and_render(
        &self,
        document_id: &str,
        target: &Lang,
        format: OutputFormat,
        profile: TranslationProfile,
    ) -> Result<TranslationResponse> {
        let translation = self
            .orchestrator(profile)
            .translate_document(document_id, target)
            .await?;

        match translation {
            DocumentTranslation::Complete(doc) => {
                let bytes = self.renderer.render(format, &doc.body, &doc.metadata)?;
                Ok(TranslationResponse::Rendered(RenderedDocument {
                    filename: doc.output_filename(format),
                    content_type: format.content_type(),
                    chunk_count: doc.chunk_count,
                    failed_chunks: doc.failed_chunks,
                    source_lang: doc.metadata.language.clone(),
                    target_lang: doc.target_lang.clone(),
                    bytes,
                }))
            }
            DocumentTranslation::NoContent => Ok(TranslationResponse::NoContent),
            DocumentTranslation::TooLarge(rejection) => {
                Ok(TranslationResponse::TooLarge(rejection))
            }
            DocumentTranslation::Unavailable(notice) => {
                Ok(TranslationResponse::Unavailable(notice))
            }
        }
    }
}
