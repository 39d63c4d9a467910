use async_trait::async_trait;
use crate::config::Lang;
use crate::error::Result;

/// Information about a translation provider backend
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Whether this provider requires an API key
    pub requires_api_key: bool,
    /// Whether this provider supports auto-detection of source language
    pub supports_auto_detect: bool,
}

/// A single translated text pair returned by a provider.
#[derive(Debug, Clone)]
pub struct ProviderTranslation {
    /// The translated text
    pub text: String,
    /// Source language as detected by the provider, when reported
    pub detected_source_lang: Option<Lang>,
}

/// Trait for translation provider backends.
///
/// Implementations make exactly one request per `translate` call and
/// classify failures through typed `Error` variants; retry policy lives
/// in the chunk translator, not here. A rate-limit signal must surface as
/// `Error::ProviderRateLimited` so callers never have to inspect error
/// messages.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Get information about this provider
    fn info(&self) -> ProviderInfo;

    /// Get the provider name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate text from source language to target language
    async fn translate(
        &self,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> Result<ProviderTranslation>;
}
