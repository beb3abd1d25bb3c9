#![deny(missing_docs)]

//! Core library for the wikirag question-answering server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and Ollama adapter.
pub mod embedding;
/// Generation client abstraction and Ollama adapter.
pub mod generation;
/// On-disk vector index and its lifecycle operations.
pub mod index;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// PDF page extraction.
pub mod pdf;
/// Ingestion and retrieval pipeline.
pub mod processing;
