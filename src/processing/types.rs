//! Core data types and error definitions for the pipeline.

use crate::embedding::EmbeddingClientError;
use crate::generation::GenerationClientError;
use crate::index::IndexError;
use crate::pdf::PdfError;
use serde::Serialize;
use thiserror::Error;

/// Errors produced while windowing text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Ingestion configured an impossible window size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors emitted by ingestion and index lifecycle operations.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Neither source directory contained a PDF to ingest.
    #[error("No PDF files found in the corpus or upload directories")]
    NoSourceFiles,
    /// Chunking step failed to window a page.
    #[error("Failed to chunk page text: {0}")]
    Chunking(#[from] ChunkingError),
    /// Source file could not be parsed as a PDF.
    #[error("Failed to extract PDF text: {0}")]
    Pdf(#[from] PdfError),
    /// Embedding provider failed to produce vectors.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Index store operation failed.
    #[error("Index operation failed: {0}")]
    Index(#[from] IndexError),
    /// Filesystem operation outside the index failed.
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted while answering a question.
#[derive(Debug, Error)]
pub enum AskError {
    /// Question was empty after trimming.
    #[error("Question must not be empty")]
    EmptyQuestion,
    /// Embedding provider failed to embed the question.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Embedding provider returned no vectors.
    #[error("Embedding provider returned no vectors for the question")]
    EmptyEmbedding,
    /// Index store query failed.
    #[error("Index operation failed: {0}")]
    Index(#[from] IndexError),
    /// Generation provider failed to produce an answer.
    #[error("Failed to generate answer: {0}")]
    Generation(#[from] GenerationClientError),
}

/// Aggregate totals reported by a reindex pass.
///
/// The pipeline reports totals only; per-file failures are logged and the
/// affected file's partial contribution is simply absent from the counts.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IngestSummary {
    /// Non-empty pages processed across all source files.
    pub pages: usize,
    /// Chunks embedded and stored across all source files.
    pub chunks: usize,
}

/// Answer with its supporting citations, ordered by retrieval rank.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Generated (or fixed no-results) answer text.
    pub answer: String,
    /// Human-readable source citations, one per retrieved chunk, in rank
    /// order; duplicates are preserved when several chunks share a page.
    pub sources: Vec<String>,
}
