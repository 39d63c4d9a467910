mod key;

pub use key::CacheKey;

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::config::{CacheConfig, Lang};

/// Snapshot of cache accounting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Map plus insertion-order queue, guarded by one mutex.
///
/// Every key in `order` is present in `entries`; overwrites keep the
/// key's original queue position.
#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

/// Process-lifetime, in-memory memo of (text, source, target) -> translation.
///
/// Entries are pure functions of their key, so concurrent stores need no
/// coordination beyond the mutex: last write wins and nothing is ever
/// invalidated except by capacity eviction.
///
/// Eviction is deliberately NOT an LRU: a periodic sweep drops the
/// oldest-inserted batch of entries once the ceiling is exceeded,
/// regardless of how recently they were read. Changing this to real
/// recency-based eviction would change observable cache statistics.
///
/// Hit/miss counters are best-effort under races; approximate counts are
/// acceptable.
pub struct TranslationCache {
    inner: Mutex<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
    max_entries: usize,
    evict_batch: usize,
    sweep_interval: Duration,
}

impl TranslationCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            max_entries: config.max_entries,
            evict_batch: config.evict_batch,
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
        }
    }

    /// Look up a cached translation. Never calls the provider.
    ///
    /// Increments the hit or miss counter as a side effect.
    pub fn lookup(&self, text: &str, source_lang: &Lang, target_lang: &Lang) -> Option<String> {
        let key = CacheKey::new(text, source_lang, target_lang);
        let cached = self.lock().entries.get(&key).cloned();

        if cached.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        cached
    }

    /// Store a translation.
    ///
    /// No-op when the translation equals the input (nothing useful to
    /// cache) or when either string is empty.
    pub fn store(&self, text: &str, translated: &str, source_lang: &Lang, target_lang: &Lang) {
        if text.is_empty() || translated.is_empty() || text == translated {
            return;
        }

        let key = CacheKey::new(text, source_lang, target_lang);
        let mut inner = self.lock();
        if inner.entries.insert(key.clone(), translated.to_string()).is_none() {
            inner.order.push_back(key);
        }
    }

    pub fn stats(&self) -> CacheStats {
        let size = self.lock().entries.len();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        #[allow(clippy::cast_precision_loss)]
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };

        CacheStats {
            size,
            hits,
            misses,
            hit_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Evict the oldest-inserted batch of entries if the ceiling is
    /// exceeded. Returns the number of entries evicted.
    ///
    /// Public so tests can drive eviction without wall-clock waits.
    pub fn sweep(&self) -> usize {
        let mut inner = self.lock();
        if inner.entries.len() <= self.max_entries {
            return 0;
        }

        let mut evicted = 0;
        while evicted < self.evict_batch {
            let Some(key) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&key);
            evicted += 1;
        }

        debug!("Cache sweep evicted {} oldest entries", evicted);
        evicted
    }

    /// Run `sweep` on a fixed interval for the life of the process.
    pub fn spawn_sweeper(self: std::sync::Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.sweep_interval);
            // The first tick completes immediately; skip it
            interval.tick().await;
            loop {
                interval.tick().await;
                self.sweep();
            }
        })
    }

    #[allow(clippy::unwrap_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned mutex means a panic while holding the lock, which
        // cannot leave the map in an inconsistent state here
        self.inner.lock().unwrap()
    }
}
