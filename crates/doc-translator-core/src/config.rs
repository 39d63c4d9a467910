use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Language codes following ISO 639-1 with regional variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Convert a language code to a human-readable display name.
///
/// Used both in provider prompts and in derived output filenames
/// (`notes_Spanish.txt`).
pub fn language_name(lang: &Lang) -> &'static str {
    match lang.as_str() {
        "en" => "English",
        "zh-CN" => "Simplified Chinese",
        "zh-TW" => "Traditional Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        // Unknown ISO codes still make usable filenames and prompts
        _ => "the specified language",
    }
}

/// Translation provider configuration for OpenAI-compatible APIs.
///
/// Supports llama.cpp, Ollama, DeepSeek, OpenAI, and any other
/// OpenAI-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl ProviderConfig {
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            model: model.into(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/v1".to_string(),
            api_key: None,
            model: "default_model".to_string(),
        }
    }
}

/// Cache configuration.
///
/// Eviction is a periodic sweep that drops the oldest-inserted entries
/// once the ceiling is exceeded. This is insertion-order eviction, not an
/// LRU; see `cache::TranslationCache`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cache entries before the sweep starts evicting
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,

    /// How many oldest entries each sweep evicts
    #[serde(default = "default_cache_evict_batch")]
    pub evict_batch: usize,

    /// Seconds between sweeps
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

const fn default_cache_max_entries() -> usize {
    1000
}

const fn default_cache_evict_batch() -> usize {
    100
}

const fn default_cache_sweep_interval_secs() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_max_entries(),
            evict_batch: default_cache_evict_batch(),
            sweep_interval_secs: default_cache_sweep_interval_secs(),
        }
    }
}

/// Self-throttle delays inserted between chunk requests.
///
/// The provider-call delays keep a sequential document under the
/// provider's rate limit; the cache-hit delay is much shorter because no
/// network round trip occurred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay after a chunk served from cache
    #[serde(default = "default_cache_hit_ms")]
    pub cache_hit_ms: u64,

    /// Delay after a provider round trip on the bulk path
    #[serde(default = "default_bulk_provider_ms")]
    pub bulk_provider_ms: u64,

    /// Delay after a provider round trip on the download path
    #[serde(default = "default_download_provider_ms")]
    pub download_provider_ms: u64,

    /// Backoff base delay for rate-limited retries on the bulk path
    #[serde(default = "default_bulk_retry_base_ms")]
    pub bulk_retry_base_ms: u64,

    /// Backoff base delay for rate-limited retries on the download path
    #[serde(default = "default_download_retry_base_ms")]
    pub download_retry_base_ms: u64,
}

const fn default_cache_hit_ms() -> u64 {
    100
}

const fn default_bulk_provider_ms() -> u64 {
    2000
}

const fn default_download_provider_ms() -> u64 {
    3000
}

const fn default_bulk_retry_base_ms() -> u64 {
    2000
}

const fn default_download_retry_base_ms() -> u64 {
    3000
}

impl PacingConfig {
    pub const fn cache_hit(&self) -> Duration {
        Duration::from_millis(self.cache_hit_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            cache_hit_ms: default_cache_hit_ms(),
            bulk_provider_ms: default_bulk_provider_ms(),
            download_provider_ms: default_download_provider_ms(),
            bulk_retry_base_ms: default_bulk_retry_base_ms(),
            download_retry_base_ms: default_download_retry_base_ms(),
        }
    }
}

/// Admission ceilings per entry point.
///
/// The download path is stricter because it is synchronous to an HTTP
/// response; the bulk path tolerates a longer pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_bulk_max_chunks")]
    pub bulk_max_chunks: usize,

    #[serde(default = "default_download_max_chunks")]
    pub download_max_chunks: usize,
}

const fn default_bulk_max_chunks() -> usize {
    100
}

const fn default_download_max_chunks() -> usize {
    50
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            bulk_max_chunks: default_bulk_max_chunks(),
            download_max_chunks: default_download_max_chunks(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Translation provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Inter-request pacing configuration
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Admission control ceilings
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}"))
        })
    }

    /// Load from default locations (~/.config/doc-translator/config.toml, ./config.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = config_dir() {
            let user_config = config_dir.join("doc-translator").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        // Return defaults
        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}
