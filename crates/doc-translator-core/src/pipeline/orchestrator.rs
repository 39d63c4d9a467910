use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::TranslationCache;
use crate::config::{AppConfig, Lang, language_name};
use crate::error::Result;
use crate::provider::TranslationProvider;
use crate::render::OutputFormat;
use crate::store::{DocumentMetadata, DocumentStore};
use super::chunk::{ChunkOutcome, ChunkTranslator};
use super::pacing::{PacingPolicy, Sleeper};
use super::probe::RateProbe;

/// Separator used to reassemble translated chunks into the document body.
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Rough per-chunk processing estimate used in admission rejections.
const PER_CHUNK_ESTIMATE_SECS: u64 = 3;

/// How long a caller should wait before retrying an unavailable provider.
const RETRY_AFTER_SECS: u64 = 60;

/// Per-entry-point design values for one orchestrator instance.
///
/// The download path is synchronous to an HTTP response, so it gets a
/// stricter admission ceiling and slower pacing than the bulk path.
#[derive(Debug, Clone, Copy)]
pub struct TranslationProfile {
    pub name: &'static str,
    /// Admission ceiling: documents with more chunks are rejected
    pub max_chunks: usize,
    /// Base delay for rate-limited retry backoff
    pub retry_base_delay: Duration,
    /// Inter-chunk pacing
    pub pacing: PacingPolicy,
}

impl TranslationProfile {
    pub const fn bulk(config: &AppConfig) -> Self {
        Self {
            name: "bulk",
            max_chunks: config.limits.bulk_max_chunks,
            retry_base_delay: Duration::from_millis(config.pacing.bulk_retry_base_ms),
            pacing: PacingPolicy::new(
                config.pacing.cache_hit(),
                Duration::from_millis(config.pacing.bulk_provider_ms),
            ),
        }
    }

    pub const fn download(config: &AppConfig) -> Self {
        Self {
            name: "download",
            max_chunks: config.limits.download_max_chunks,
            retry_base_delay: Duration::from_millis(config.pacing.download_retry_base_ms),
            pacing: PacingPolicy::new(
                config.pacing.cache_hit(),
                Duration::from_millis(config.pacing.download_provider_ms),
            ),
        }
    }
}

/// Pointer to the original, untranslated document a caller can always
/// fall back to.
#[derive(Debug, Clone)]
pub struct FallbackDownload {
    pub document_id: String,
    pub description: String,
}

impl FallbackDownload {
    fn original(document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            description:
                "Download the original, untranslated document instead of retrying translation"
                    .to_string(),
        }
    }
}

/// Structured rejection for documents over the admission ceiling.
#[derive(Debug, Clone)]
pub struct AdmissionRejection {
    pub chunk_count: usize,
    pub max_chunks: usize,
    pub estimated_secs: u64,
    /// Human-readable estimate, e.g. "about 6 minutes"
    pub estimated: String,
    /// Chunk count at which the request would be admitted
    pub suggested_max_chunks: usize,
    pub fallback: FallbackDownload,
}

/// Structured rejection when the availability probe fails.
#[derive(Debug, Clone)]
pub struct UnavailableNotice {
    pub retry_after_secs: u64,
    /// Human-readable alternatives to retrying right now
    pub alternatives: Vec<String>,
    pub fallback: FallbackDownload,
}

/// A fully assembled translated document.
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    pub metadata: DocumentMetadata,
    /// Translated chunks joined in index order with [`CHUNK_SEPARATOR`]
    pub body: String,
    pub chunk_count: usize,
    /// Chunks that degraded to their original text
    pub failed_chunks: usize,
    pub target_lang: Lang,
}

impl TranslatedDocument {
    pub const fn source_lang(&self) -> &Lang {
        &self.metadata.language
    }

    pub fn byte_len(&self) -> usize {
        self.body.len()
    }

    /// Derived output filename: `{stem}_{TargetLanguageDisplayName}.{ext}`
    pub fn output_filename(&self, format: OutputFormat) -> String {
        let stem = Path::new(&self.metadata.title)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        format!(
            "{stem}_{}.{}",
            language_name(&self.target_lang),
            format.extension()
        )
    }
}

/// Whole-document translation result.
///
/// Every exit path of the orchestrator is one of these variants; the only
/// errors that escape are store-level ones such as document-not-found.
#[derive(Debug, Clone)]
pub enum DocumentTranslation {
    /// Translation ran to the end (individual chunks may have degraded)
    Complete(TranslatedDocument),
    /// The document has no chunks; not an error
    NoContent,
    /// Rejected by admission control before any translation work
    TooLarge(AdmissionRejection),
    /// Provider unavailable; aborted before any chunk work
    Unavailable(UnavailableNotice),
}

/// Progress callback: (chunks done, total chunks).
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send>;

/// Sequences all chunks of a document through the chunk translator.
///
/// The chunk loop is intentionally sequential with deliberate pacing:
/// concurrent requests to a rate-limited provider trigger more
/// throttling, not less, so throughput is traded for reliability.
pub struct DocumentTranslationOrchestrator {
    store: Arc<dyn DocumentStore>,
    translator: ChunkTranslator,
    probe: RateProbe,
    sleeper: Arc<dyn Sleeper>,
    profile: TranslationProfile,
}

impl DocumentTranslationOrchestrator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn TranslationProvider>,
        cache: Arc<TranslationCache>,
        sleeper: Arc<dyn Sleeper>,
        profile: TranslationProfile,
    ) -> Self {
        let translator = ChunkTranslator::new(
            provider,
            cache,
            Arc::clone(&sleeper),
            profile.retry_base_delay,
        );
        let probe = RateProbe::new(translator.clone());

        Self {
            store,
            translator,
            probe,
            sleeper,
            profile,
        }
    }

    pub async fn translate_document(
        &self,
        document_id: &str,
        target: &Lang,
    ) -> Result<DocumentTranslation> {
        self.translate_document_with_progress(document_id, target, None)
            .await
    }

    pub async fn translate_document_with_progress(
        &self,
        document_id: &str,
        target: &Lang,
        progress: Option<ProgressCallback>,
    ) -> Result<DocumentTranslation> {
        let metadata = self.store.get_metadata(document_id).await?;
        let chunks = self.store.get_chunks(document_id).await?;

        if chunks.is_empty() {
            debug!("Document {} has no chunks", document_id);
            return Ok(DocumentTranslation::NoContent);
        }

        // Admission control: protect the pipeline and the provider from
        // unbounded-duration requests
        if chunks.len() > self.profile.max_chunks {
            info!(
                "Rejecting document {} on the {} path: {} chunks over ceiling {}",
                document_id,
                self.profile.name,
                chunks.len(),
                self.profile.max_chunks
            );
            return Ok(DocumentTranslation::TooLarge(
                self.reject_too_large(document_id, chunks.len()),
            ));
        }

        // Same-language short-circuit: the joined original text is the result
        if metadata.language.as_str() == target.as_str() {
            debug!(
                "Document {} already in {}, skipping translation",
                document_id, target
            );
            let body = join_chunks(chunks.iter().map(|c| c.content.as_str()));
            let chunk_count = chunks.len();
            return Ok(DocumentTranslation::Complete(TranslatedDocument {
                metadata,
                body,
                chunk_count,
                failed_chunks: 0,
                target_lang: target.clone(),
            }));
        }

        // All-or-nothing availability gate: never start a batch against a
        // provider the canary could not get through
        if !self.probe.is_available(&metadata.language, target).await {
            warn!(
                "Provider unavailable, aborting document {} before chunk work",
                document_id
            );
            return Ok(DocumentTranslation::Unavailable(UnavailableNotice {
                retry_after_secs: RETRY_AFTER_SECS,
                alternatives: vec![
                    format!("Wait about {RETRY_AFTER_SECS} seconds and retry"),
                    "Download the original document".to_string(),
                    "Try a smaller document".to_string(),
                ],
                fallback: FallbackDownload::original(document_id),
            }));
        }

        let total = chunks.len();
        info!(
            "Translating document {} ({} chunks, {} -> {}) on the {} path",
            document_id, total, metadata.language, target, self.profile.name
        );

        let mut outcomes: Vec<ChunkOutcome> = Vec::with_capacity(total);
        for (i, chunk) in chunks.iter().enumerate() {
            let outcome = self
                .translator
                .translate_chunk(&chunk.content, &chunk.language, target)
                .await;

            if !outcome.succeeded {
                warn!(
                    "Chunk {} of document {} degraded to original text after {} attempts",
                    chunk.index, document_id, outcome.attempts
                );
            }

            if let Some(ref callback) = progress {
                callback(i + 1, total);
            }

            // Self-throttle between chunks, but not after the last one
            if i + 1 < total {
                let delay = self.profile.pacing.delay_after(outcome.from_cache);
                self.sleeper.sleep(delay).await;
            }

            outcomes.push(outcome);
        }

        let failed_chunks = outcomes.iter().filter(|o| !o.succeeded).count();
        let body = join_chunks(outcomes.iter().map(|o| o.text.as_str()));

        info!(
            "Document {} complete: {} chunks, {} degraded",
            document_id, total, failed_chunks
        );

        Ok(DocumentTranslation::Complete(TranslatedDocument {
            metadata,
            body,
            chunk_count: total,
            failed_chunks,
            target_lang: target.clone(),
        }))
    }

    fn reject_too_large(&self, document_id: &str, chunk_count: usize) -> AdmissionRejection {
        let estimated_secs = chunk_count as u64 * PER_CHUNK_ESTIMATE_SECS;
        AdmissionRejection {
            chunk_count,
            max_chunks: self.profile.max_chunks,
            estimated_secs,
            estimated: human_duration(estimated_secs),
            suggested_max_chunks: self.profile.max_chunks,
            fallback: FallbackDownload::original(document_id),
        }
    }
}

fn join_chunks<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.collect::<Vec<_>>().join(CHUNK_SEPARATOR)
}

fn human_duration(secs: u64) -> String {
    if secs < 120 {
        format!("about {secs} seconds")
    } else {
        format!("about {} minutes", secs.div_ceil(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!(human_duration(90), "about 90 seconds");
        assert_eq!(human_duration(303), "about 6 minutes");
    }

    #[test]
    fn test_join_chunks_uses_blank_line_separator() {
        let joined = join_chunks(["a", "b", "c"].into_iter());
        assert_eq!(joined, "a\n\nb\n\nc");
    }

    #[test]
    fn test_profile_design_values() {
        let config = AppConfig::default();
        let bulk = TranslationProfile::bulk(&config);
        assert_eq!(bulk.max_chunks, 100);
        assert_eq!(bulk.retry_base_delay, Duration::from_secs(2));
        assert_eq!(bulk.pacing.provider_call, Duration::from_secs(2));

        let download = TranslationProfile::download(&config);
        assert_eq!(download.max_chunks, 50);
        assert_eq!(download.retry_base_delay, Duration::from_secs(3));
        assert_eq!(download.pacing.cache_hit, Duration::from_millis(100));
    }
}
