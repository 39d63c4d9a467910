use serde_json::json;

use crate::error::{Error, Result};
use crate::store::DocumentMetadata;

/// Output format for a rendered translation, selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    PlainText,
    Markdown,
    Json,
    Docx,
    Pdf,
}

impl OutputFormat {
    /// Parse a caller-supplied format name. Unknown names fall back to
    /// plain text rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "md" | "markdown" => Self::Markdown,
            "json" => Self::Json,
            "doc" | "docx" | "word" => Self::Docx,
            "pdf" => Self::Pdf,
            _ => Self::PlainText,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain; charset=utf-8",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Json => "application/json",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pdf => "application/pdf",
        }
    }
}

/// Renders translated content plus metadata into a byte payload.
///
/// The quality of rendered output is a black box to the pipeline; this
/// trait is the seam where a real word-processor/PDF renderer plugs in.
pub trait DocumentRenderer: Send + Sync {
    fn render(
        &self,
        format: OutputFormat,
        content: &str,
        metadata: &DocumentMetadata,
    ) -> Result<Vec<u8>>;
}

/// Built-in renderer for text-like formats.
///
/// Plain text and Markdown pass the body through unchanged; JSON wraps
/// it with the document metadata. Word-processor and PDF rendering is
/// delegated to an external collaborator, so those formats fall back to
/// the plain-text bytes here.
pub struct TextRenderer;

impl DocumentRenderer for TextRenderer {
    fn render(
        &self,
        format: OutputFormat,
        content: &str,
        metadata: &DocumentMetadata,
    ) -> Result<Vec<u8>> {
        match format {
            OutputFormat::PlainText | OutputFormat::Markdown | OutputFormat::Docx
            | OutputFormat::Pdf => Ok(content.as_bytes().to_vec()),
            OutputFormat::Json => {
                let payload = json!({
                    "title": metadata.title,
                    "source_language": metadata.language.as_str(),
                    "chunk_count": metadata.chunk_count,
                    "content": content,
                });
                serde_json::to_vec_pretty(&payload).map_err(|e| Error::Render(e.to_string()))
            }
        }
    }
}
