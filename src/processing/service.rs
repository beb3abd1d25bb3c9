//! Processing service coordinating extraction, chunking, embedding, index
//! writes, and answer synthesis.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::get_config,
    embedding::{EmbeddingClient, OllamaEmbeddingClient},
    generation::{GenerationClient, OllamaGenerationClient},
    index::{ChunkMetadata, EntryInsert, IndexStore},
    metrics::{MetricsSnapshot, PipelineMetrics},
    pdf::{LopdfExtractor, PdfExtractor},
    processing::{
        chunking::chunk_text,
        normalize::normalize,
        prompt::{NO_RESULTS_ANSWER, build_prompt},
        types::{Answer, AskError, IngestSummary, ProcessingError},
    },
};

/// Directory and windowing parameters for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Curated corpus directory.
    pub pdf_dir: PathBuf,
    /// User-upload directory.
    pub upload_dir: PathBuf,
    /// Chunk window size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent windows in characters.
    pub chunk_overlap: usize,
}

/// Coordinates the full pipeline from source PDFs to answered questions.
///
/// The service owns long-lived handles to the embedding and generation
/// clients, the PDF extractor, and the index store. Construct it once near
/// process start and share it through an `Arc`; the index store handle is the
/// single shared mutable resource between ingestion and retrieval.
pub struct ProcessingService {
    embedding_client: Box<dyn EmbeddingClient>,
    generation_client: Box<dyn GenerationClient>,
    extractor: Box<dyn PdfExtractor>,
    index: IndexStore,
    settings: PipelineSettings,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipeline used by the HTTP surface.
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Store an uploaded PDF under the upload directory.
    async fn store_upload(&self, filename: &str, bytes: Vec<u8>) -> Result<(), ProcessingError>;

    /// Run the full ingestion pipeline over both source directories.
    async fn reindex(&self) -> Result<IngestSummary, ProcessingError>;

    /// Answer a question from the indexed corpus.
    async fn ask(&self, question: &str, k: usize) -> Result<Answer, AskError>;

    /// Delete and recreate the index.
    async fn wipe(&self) -> Result<(), ProcessingError>;

    /// Pack the on-disk index into a downloadable archive.
    async fn export_index(&self) -> Result<Vec<u8>, ProcessingError>;

    /// Destructively replace the on-disk index with the archive's contents.
    async fn import_index(&self, archive: Vec<u8>) -> Result<(), ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl ProcessingService {
    /// Build a service from explicit components.
    pub fn new(
        embedding_client: Box<dyn EmbeddingClient>,
        generation_client: Box<dyn GenerationClient>,
        extractor: Box<dyn PdfExtractor>,
        index: IndexStore,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            embedding_client,
            generation_client,
            extractor,
            index,
            settings,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Build a service wired from the global configuration, creating the
    /// source and index directories as needed.
    pub fn from_env() -> Result<Self, ProcessingError> {
        let config = get_config();
        fs::create_dir_all(&config.pdf_dir)?;
        fs::create_dir_all(&config.upload_dir)?;
        fs::create_dir_all(&config.index_dir)?;

        let embedding_client = Box::new(OllamaEmbeddingClient::new(
            config.ollama_url.clone(),
            config.embedding_model.clone(),
        ));
        let generation_client = Box::new(OllamaGenerationClient::new(
            config.ollama_url.clone(),
            config.generation_model.clone(),
        ));
        let index = IndexStore::new(&config.index_dir, &config.collection_name);
        let settings = PipelineSettings {
            pdf_dir: config.pdf_dir.clone(),
            upload_dir: config.upload_dir.clone(),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        };

        tracing::info!(
            pdf_dir = %settings.pdf_dir.display(),
            upload_dir = %settings.upload_dir.display(),
            index_dir = %index.root().display(),
            "Processing service initialized"
        );

        Ok(Self::new(
            embedding_client,
            generation_client,
            Box::new(LopdfExtractor),
            index,
            settings,
        ))
    }

    /// Enumerate candidate PDFs from both source directories, curated corpus
    /// first, each sorted by file name.
    fn collect_sources(&self) -> Result<Vec<PathBuf>, ProcessingError> {
        let mut sources = Vec::new();
        for dir in [&self.settings.pdf_dir, &self.settings.upload_dir] {
            sources.extend(list_pdfs(dir)?);
        }
        Ok(sources)
    }

    /// Ingest one source file, updating the running totals as pages succeed.
    ///
    /// On failure mid-file, totals keep the contribution of the pages that
    /// completed before the failure; the caller logs and moves on.
    async fn ingest_file(
        &self,
        path: &Path,
        summary: &mut IngestSummary,
    ) -> Result<(), ProcessingError> {
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let pages = self.extractor.extract_pages(path)?;

        for page in pages {
            let text = normalize(&page.text);
            if text.is_empty() {
                continue;
            }
            summary.pages += 1;

            let chunks = chunk_text(&text, self.settings.chunk_size, self.settings.chunk_overlap)?;
            if chunks.is_empty() {
                continue;
            }

            let vectors = self.embedding_client.generate_embeddings(chunks.clone()).await?;
            let inserts: Vec<EntryInsert> = chunks
                .into_iter()
                .zip(vectors)
                .map(|(text, vector)| EntryInsert {
                    text,
                    metadata: ChunkMetadata {
                        source: source.clone(),
                        page: Some(page.number),
                    },
                    vector,
                })
                .collect();

            let stored = self.index.upsert(inserts).await?;
            summary.chunks += stored;
        }

        tracing::debug!(file = %source, "Source file ingested");
        Ok(())
    }
}

fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, ProcessingError> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "Source directory missing; skipping");
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

#[async_trait]
impl ProcessingApi for ProcessingService {
    async fn store_upload(&self, filename: &str, bytes: Vec<u8>) -> Result<(), ProcessingError> {
        // Keep only the final path component so uploads cannot escape the directory.
        let name = Path::new(filename)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());

        fs::create_dir_all(&self.settings.upload_dir)?;
        let destination = self.settings.upload_dir.join(&name);
        fs::write(&destination, bytes)?;
        tracing::info!(file = %name, "Upload stored");
        Ok(())
    }

    async fn reindex(&self) -> Result<IngestSummary, ProcessingError> {
        let sources = self.collect_sources()?;
        if sources.is_empty() {
            return Err(ProcessingError::NoSourceFiles);
        }

        let mut summary = IngestSummary::default();
        for path in &sources {
            if let Err(error) = self.ingest_file(path, &mut summary).await {
                tracing::warn!(
                    file = %path.display(),
                    error = %error,
                    "Skipping source file after failure"
                );
            }
        }

        self.metrics
            .record_ingest(summary.pages as u64, summary.chunks as u64);
        tracing::info!(
            files = sources.len(),
            pages = summary.pages,
            chunks = summary.chunks,
            "Reindex completed"
        );
        Ok(summary)
    }

    async fn ask(&self, question: &str, k: usize) -> Result<Answer, AskError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskError::EmptyQuestion);
        }

        let mut vectors = self
            .embedding_client
            .generate_embeddings(vec![question.to_string()])
            .await?;
        let vector = vectors.pop().ok_or(AskError::EmptyEmbedding)?;

        let hits = self.index.query(&vector, k).await?;
        if hits.is_empty() {
            tracing::debug!("Query matched nothing; returning fixed no-results answer");
            return Ok(Answer {
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let contexts: Vec<String> = hits.iter().map(|hit| hit.text.clone()).collect();
        let prompt = build_prompt(question, &contexts);
        let answer = self.generation_client.generate(prompt).await?;

        let sources = hits
            .iter()
            .map(|hit| hit.metadata.format_citation())
            .collect();

        self.metrics.record_question();
        Ok(Answer { answer, sources })
    }

    async fn wipe(&self) -> Result<(), ProcessingError> {
        self.index.wipe().await.map_err(ProcessingError::from)
    }

    async fn export_index(&self) -> Result<Vec<u8>, ProcessingError> {
        self.index
            .export_archive()
            .await
            .map_err(ProcessingError::from)
    }

    async fn import_index(&self, archive: Vec<u8>) -> Result<(), ProcessingError> {
        self.index
            .import_archive(&archive)
            .await
            .map_err(ProcessingError::from)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
