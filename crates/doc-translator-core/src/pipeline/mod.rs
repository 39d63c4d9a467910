mod chunk;
mod orchestrator;
mod pacing;
mod probe;

pub use chunk::{ChunkOutcome, ChunkTranslator, MAX_ATTEMPTS};
pub use orchestrator::{
    AdmissionRejection, CHUNK_SEPARATOR, DocumentTranslation, DocumentTranslationOrchestrator,
    FallbackDownload, ProgressCallback, TranslatedDocument, TranslationProfile,
    UnavailableNotice,
};
pub use pacing::{PacingPolicy, Sleeper, TokioSleeper};
pub use probe::RateProbe;
