use tracing::debug;

use crate::config::Lang;
use super::chunk::ChunkTranslator;

/// Canary text sent through the translator to test availability.
const CANARY: &str = "hello";

/// Cheap availability check run before committing to a long batch.
///
/// Sends one minimal canary word through the chunk translator and treats
/// the provider as available only if the text actually changed. Advisory
/// only: a false negative degrades UX with an early bail-out but never
/// corrupts data.
pub struct RateProbe {
    translator: ChunkTranslator,
}

impl RateProbe {
    pub const fn new(translator: ChunkTranslator) -> Self {
        Self { translator }
    }

    pub async fn is_available(&self, source: &Lang, target: &Lang) -> bool {
        let outcome = self.translator.translate_chunk(CANARY, source, target).await;
        let available = outcome.succeeded && outcome.text != CANARY;
        debug!(
            "Rate probe ({} -> {}): available = {}",
            source, target, available
        );
        available
    }
}
