use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::TranslationCache;
use crate::config::Lang;
use crate::provider::TranslationProvider;
use super::pacing::Sleeper;

/// Maximum provider attempts per chunk, rate-limited retries included.
pub const MAX_ATTEMPTS: u32 = 3;

/// Per-chunk translation result.
///
/// `text` is always usable: the translation on success, the original
/// chunk content on failure. The pipeline never produces gaps.
#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    pub text: String,
    pub succeeded: bool,
    pub attempts: u32,
    pub from_cache: bool,
}

impl ChunkOutcome {
    fn skipped(text: &str) -> Self {
        Self {
            text: text.to_string(),
            succeeded: true,
            attempts: 0,
            from_cache: false,
        }
    }

    fn failed(text: &str, attempts: u32) -> Self {
        Self {
            text: text.to_string(),
            succeeded: false,
            attempts,
            from_cache: false,
        }
    }
}

/// Translates one chunk through the provider, absorbing failures.
///
/// Rate-limited responses are retried up to [`MAX_ATTEMPTS`] with a
/// backoff of `attempt_number x base_delay`; the base delay is chosen by
/// the call site (bulk vs. download path). Any other provider failure,
/// and exhausted retries, degrade to the original text - errors never
/// reach the caller.
#[derive(Clone)]
pub struct ChunkTranslator {
    provider: Arc<dyn TranslationProvider>,
    cache: Arc<TranslationCache>,
    sleeper: Arc<dyn Sleeper>,
    retry_base_delay: Duration,
}

impl ChunkTranslator {
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        cache: Arc<TranslationCache>,
        sleeper: Arc<dyn Sleeper>,
        retry_base_delay: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            sleeper,
            retry_base_delay,
        }
    }

    pub async fn translate_chunk(
        &self,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> ChunkOutcome {
        // Nothing to do for blank text or same-language requests; the
        // cache is not consulted either
        if text.trim().is_empty() || source.as_str() == target.as_str() {
            return ChunkOutcome::skipped(text);
        }

        if let Some(cached) = self.cache.lookup(text, source, target) {
            debug!("Cache hit for chunk ({} -> {})", source, target);
            return ChunkOutcome {
                text: cached,
                succeeded: true,
                attempts: 0,
                from_cache: true,
            };
        }

        let mut attempts = 0;
        while attempts < MAX_ATTEMPTS {
            attempts += 1;

            match self.provider.translate(text, source, target).await {
                Ok(reply) => {
                    // An empty or unchanged reply is useless; treat it as
                    // a failed chunk rather than caching a no-op
                    if reply.text.is_empty() || reply.text == text {
                        warn!("Provider returned unchanged text, marking chunk failed");
                        return ChunkOutcome::failed(text, attempts);
                    }

                    self.cache.store(text, &reply.text, source, target);
                    return ChunkOutcome {
                        text: reply.text,
                        succeeded: true,
                        attempts,
                        from_cache: false,
                    };
                }
                Err(e) if e.is_rate_limited() => {
                    if attempts < MAX_ATTEMPTS {
                        let delay = self.retry_base_delay * attempts;
                        warn!(
                            "Rate limited on attempt {}/{}, backing off {:?}",
                            attempts, MAX_ATTEMPTS, delay
                        );
                        self.sleeper.sleep(delay).await;
                    }
                }
                Err(e) => {
                    // Non-rate-limit failures are not retried
                    warn!("Chunk translation failed: {}", e);
                    return ChunkOutcome::failed(text, attempts);
                }
            }
        }

        warn!("Chunk translation gave up after {} attempts", MAX_ATTEMPTS);
        ChunkOutcome::failed(text, MAX_ATTEMPTS)
    }
}
