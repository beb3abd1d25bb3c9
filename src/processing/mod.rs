//! Ingestion and retrieval pipeline: normalization, chunking, embedding,
//! index writes, and answer synthesis.

pub mod chunking;
pub mod normalize;
mod prompt;
mod service;
pub mod types;

pub use service::{PipelineSettings, ProcessingApi, ProcessingService};
pub use types::{Answer, AskError, ChunkingError, IngestSummary, ProcessingError};
