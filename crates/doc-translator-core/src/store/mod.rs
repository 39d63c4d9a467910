use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;
use uuid::Uuid;

use crate::config::Lang;
use crate::error::{Error, Result};

/// A contiguous slice of a document's text, the unit of translation.
///
/// Immutable once produced by upstream chunking; the pipeline only reads
/// it. The ordinal index defines reassembly order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub document_id: String,
    /// Zero-based ordinal, defines reassembly order
    pub index: usize,
    pub content: String,
    pub language: Lang,
}

/// Lifecycle tag for a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploaded,
    Ready,
}

/// Read-only document description; the pipeline never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub id: String,
    pub title: String,
    /// Declared or detected source language
    pub language: Lang,
    pub chunk_count: usize,
    pub size_bytes: u64,
    pub uploaded_at: SystemTime,
    pub status: DocumentStatus,
}

/// Keyed chunk/metadata persistence the pipeline reads from.
///
/// Implementations must return chunks in stable ascending-index order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_chunks(&self, document_id: &str) -> Result<Vec<Chunk>>;

    async fn get_metadata(&self, document_id: &str) -> Result<DocumentMetadata>;
}

struct StoredDocument {
    metadata: DocumentMetadata,
    chunks: Vec<Chunk>,
}

/// In-memory document store used by the CLI and tests.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, StoredDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document from pre-chunked text, returning its generated id.
    pub fn insert_document(
        &self,
        title: impl Into<String>,
        language: Lang,
        chunk_texts: Vec<String>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let size_bytes = chunk_texts.iter().map(|c| c.len() as u64).sum();

        let chunks = chunk_texts
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk {
                document_id: id.clone(),
                index,
                content,
                language: language.clone(),
            })
            .collect::<Vec<_>>();

        let metadata = DocumentMetadata {
            id: id.clone(),
            title: title.into(),
            language,
            chunk_count: chunks.len(),
            size_bytes,
            uploaded_at: SystemTime::now(),
            status: DocumentStatus::Ready,
        };

        self.lock().insert(id.clone(), StoredDocument { metadata, chunks });
        id
    }

    #[allow(clippy::unwrap_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredDocument>> {
        self.documents.lock().unwrap()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_chunks(&self, document_id: &str) -> Result<Vec<Chunk>> {
        let documents = self.lock();
        let doc = documents
            .get(document_id)
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))?;

        let mut chunks = doc.chunks.clone();
        // Contract: stable ascending-index order
        chunks.sort_by_key(|c| c.index);
        Ok(chunks)
    }

    async fn get_metadata(&self, document_id: &str) -> Result<DocumentMetadata> {
        self.lock()
            .get(document_id)
            .map(|doc| doc.metadata.clone())
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))
    }
}
