use async_trait::async_trait;
use std::time::Duration;

/// Abstraction over waiting, so tests can observe delays without
/// spending wall-clock time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Inter-chunk self-throttle policy.
///
/// A chunk served from cache made no network round trip, so it only
/// earns the short delay; a provider round trip earns the long one. This
/// keeps a sequential document under the provider's rate limit and is
/// not a correctness requirement.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    pub cache_hit: Duration,
    pub provider_call: Duration,
}

impl PacingPolicy {
    pub const fn new(cache_hit: Duration, provider_call: Duration) -> Self {
        Self {
            cache_hit,
            provider_call,
        }
    }

    /// Delay owed after a chunk, depending on where it was served from.
    pub const fn delay_after(&self, from_cache: bool) -> Duration {
        if from_cache {
            self.cache_hit
        } else {
            self.provider_call
        }
    }
}
