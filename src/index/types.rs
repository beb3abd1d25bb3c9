//! Shared types used by the index store and its lifecycle helpers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while operating the on-disk index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Filesystem operation on the index tree failed.
    #[error("Index I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Collection contents could not be serialized or deserialized.
    #[error("Index serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
    /// Archive could not be written or read.
    #[error("Index archive failed: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Provenance attached to every stored chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name of the source document.
    pub source: String,
    /// 1-based page number within the source document, when known.
    #[serde(default)]
    pub page: Option<u32>,
}

impl ChunkMetadata {
    /// Render the metadata as a human-readable citation.
    pub fn format_citation(&self) -> String {
        match self.page {
            Some(page) => format!("{} (p. {page})", self.source),
            None => self.source.clone(),
        }
    }
}

/// Entry prepared for insertion, before the store assigns an identifier.
#[derive(Debug, Clone)]
pub struct EntryInsert {
    /// Chunk text.
    pub text: String,
    /// Source metadata for the chunk.
    pub metadata: ChunkMetadata,
    /// Embedding vector produced for the chunk.
    pub vector: Vec<f32>,
}

/// Persisted form of one chunk/embedding pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Synthetic identifier, unique across the collection.
    pub id: String,
    /// Chunk text.
    pub text: String,
    /// Source metadata for the chunk.
    pub metadata: ChunkMetadata,
    /// Embedding vector.
    pub vector: Vec<f32>,
    /// RFC 3339 timestamp recorded at ingestion time.
    pub ingested_at: String,
}

/// One ranked result of a similarity query.
#[derive(Debug, Clone)]
pub struct QueryHit {
    /// Chunk text.
    pub text: String,
    /// Source metadata for the chunk.
    pub metadata: ChunkMetadata,
    /// Cosine similarity against the query vector.
    pub score: f32,
}
