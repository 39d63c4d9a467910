//! Doc Translator CLI - Command line tool for translating text documents.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use doc_translator_core::{
    AppConfig, DocTranslator, DocumentRenderer, Lang, MemoryDocumentStore, OutputFormat,
    ProviderConfig, TextRenderer, TranslationProfile,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileOption {
    /// Larger admission ceiling, standard pacing
    Bulk,
    /// Stricter ceiling and slower pacing, as used for synchronous downloads
    Download,
}

#[derive(Parser, Debug)]
#[command(name = "doc-translate")]
#[command(author, version, about = "Translate text documents", long_about = None)]
struct Args {
    /// Input text file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: derived from input and target language)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language code
    #[arg(short = 's', long, default_value = "en")]
    source: String,

    /// Target language code
    #[arg(short = 't', long, default_value = "es")]
    target: String,

    /// Output format (txt, md, json, docx, pdf; unknown falls back to txt)
    #[arg(short, long, default_value = "txt")]
    format: String,

    /// Translation profile
    #[arg(long, value_enum, default_value = "bulk")]
    profile: ProfileOption,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE", default_value = "http://localhost:8080/v1")]
    api_base: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,

    /// Model name for OpenAI-compatible API
    #[arg(long, env = "OPENAI_MODEL", default_value = "default_model")]
    model: String,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Split a document into translation chunks on blank lines.
fn split_into_chunks(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    // Override provider settings with CLI arguments
    config.provider = ProviderConfig::new(args.api_base, args.api_key, args.model);

    let profile = match args.profile {
        ProfileOption::Bulk => TranslationProfile::bulk(&config),
        ProfileOption::Download => TranslationProfile::download(&config),
    };
    let format = OutputFormat::from_name(&args.format);
    let target = Lang::new(&args.target);

    // Load and chunk the input document
    info!("Loading document: {}", args.input.display());
    let text = std::fs::read_to_string(&args.input)
        .context(format!("Failed to read input: {}", args.input.display()))?;

    let chunks = split_into_chunks(&text);
    if chunks.is_empty() {
        anyhow::bail!("Input document has no content");
    }
    info!("Document has {} chunks", chunks.len());

    let filename = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document.txt")
        .to_string();

    let store = Arc::new(MemoryDocumentStore::new());
    let document_id = store.insert_document(filename, Lang::new(&args.source), chunks.clone());

    // Create translator
    let translator =
        DocTranslator::new(config, store).context("Failed to initialize translator")?;
    let _sweeper = translator.start_cache_sweeper();

    // Setup progress bar
    #[allow(clippy::cast_possible_truncation)]
    let pb = ProgressBar::new(chunks.len() as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let progress = {
        let pb = pb.clone();
        Box::new(move |done: usize, _total: usize| {
            pb.set_position(done as u64);
        })
    };

    let result = translator
        .translate_document_with_progress(&document_id, &target, profile, progress)
        .await
        .context("Translation pipeline failed")?;

    pb.finish_and_clear();

    let doc = match result {
        doc_translator_core::DocumentTranslation::Complete(doc) => doc,
        doc_translator_core::DocumentTranslation::NoContent => {
            anyhow::bail!("Document has no translatable content");
        }
        doc_translator_core::DocumentTranslation::TooLarge(rejection) => {
            anyhow::bail!(
                "Document too large: {} chunks (ceiling {}). Estimated processing time {}. \
                 Split the input below {} chunks, or {}.",
                rejection.chunk_count,
                rejection.max_chunks,
                rejection.estimated,
                rejection.suggested_max_chunks,
                rejection.fallback.description.to_lowercase(),
            );
        }
        doc_translator_core::DocumentTranslation::Unavailable(notice) => {
            anyhow::bail!(
                "Translation service unavailable. Retry in about {} seconds. Alternatives: {}",
                notice.retry_after_secs,
                notice.alternatives.join("; "),
            );
        }
    };

    if doc.failed_chunks > 0 {
        tracing::warn!(
            "{} of {} chunks kept their original text",
            doc.failed_chunks,
            doc.chunk_count
        );
    }

    // Render and save
    let output_name = doc.output_filename(format);
    let rendered = TextRenderer
        .render(format, &doc.body, &doc.metadata)
        .context("Failed to render output")?;

    let output_path = args
        .output
        .unwrap_or_else(|| args.input.with_file_name(&output_name));

    std::fs::write(&output_path, rendered)
        .context(format!("Failed to write output: {}", output_path.display()))?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("Translated document saved to: {}", output_path.display());
    }

    Ok(())
}
