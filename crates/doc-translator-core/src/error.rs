use thiserror::Error;

/// Unified error type for doc-translator-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Translation provider operations (requests, responses, rate limiting)
/// - Document store operations (lookups)
/// - Rendering operations
/// - Configuration operations (loading, validation)
/// - General I/O operations
///
/// Rate limiting is a dedicated variant so callers classify it by type,
/// never by matching on the error message.
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Translation Provider Errors
    // ==========================================================================
    /// Translation provider request failed
    #[error("translation provider request failed: {0}")]
    ProviderRequest(String),

    /// Invalid response from the translation provider
    #[error("invalid translation provider response: {0}")]
    ProviderInvalidResponse(String),

    /// Rate limited by the translation provider
    #[error("translation rate limited{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    ProviderRateLimited { retry_after: Option<u64> },

    /// Translation request timed out
    #[error("translation request timed out")]
    ProviderTimeout,

    // ==========================================================================
    // Document Store Errors
    // ==========================================================================
    /// Document or its chunks absent from the store
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    // ==========================================================================
    // Rendering Errors
    // ==========================================================================
    /// Failed to render translated content into the requested format
    #[error("failed to render document: {0}")]
    Render(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is the provider's "too many requests" signal.
    ///
    /// Rate-limited failures are the only ones worth retrying at chunk
    /// granularity; everything else fails fast.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::ProviderRateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
