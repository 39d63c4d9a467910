mod traits;
mod openai;

pub use traits::{ProviderInfo, ProviderTranslation, TranslationProvider};
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a translation provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn TranslationProvider>> {
    let provider = OpenAiProvider::new(
        config.api_base.clone(),
        config.api_key.clone(),
        config.model.clone(),
    );

    Ok(Arc::new(provider))
}
