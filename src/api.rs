//! HTTP surface for wikirag.
//!
//! This module exposes a compact Axum router over the processing pipeline:
//!
//! - `POST /api/upload` – Store a PDF under the upload directory (extension check only).
//! - `POST /api/index` – Run the ingestion pipeline over both source directories.
//! - `POST /api/ask` – Answer a question from the indexed corpus with source citations.
//! - `POST /api/wipe` – Delete and recreate the index.
//! - `POST /api/export` – Download the on-disk index as a zip archive.
//! - `POST /api/import` – Destructively replace the index with an uploaded archive.
//! - `GET /api/metrics` – Observe ingestion and retrieval counters.
//! - `GET /healthz` – Liveness signal with no index dependency.
//!
//! Authentication and the HTML chat UI live outside this crate; only the
//! semantic contract of each endpoint is implemented here.

use crate::metrics::MetricsSnapshot;
use crate::processing::{Answer, AskError, IngestSummary, ProcessingApi, ProcessingError};
use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Default number of chunks retrieved per question.
const DEFAULT_TOP_K: usize = 5;

/// Build the HTTP router exposing the pipeline API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: ProcessingApi + 'static,
{
    Router::new()
        .route("/api/upload", post(upload::<S>))
        .route("/api/index", post(reindex::<S>))
        .route("/api/ask", post(ask::<S>))
        .route("/api/wipe", post(wipe::<S>))
        .route("/api/export", post(export::<S>))
        .route("/api/import", post(import::<S>))
        .route("/api/metrics", get(get_metrics::<S>))
        .route("/healthz", get(health))
        .with_state(service)
}

/// Success response for `POST /api/upload`.
#[derive(Serialize)]
struct UploadResponse {
    filename: String,
}

/// Accept a PDF upload as a multipart `pdf` field.
///
/// Rejection is by extension only; the design deliberately performs no
/// content sniffing.
async fn upload<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: ProcessingApi,
{
    let (filename, bytes) = read_file_field(multipart, &["pdf"]).await?;
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::BadRequest("Only PDF files are accepted".into()));
    }

    service.store_upload(&filename, bytes).await?;
    tracing::info!(file = %filename, "Upload accepted");
    Ok(Json(UploadResponse { filename }))
}

/// Run the ingestion pipeline and report aggregate totals.
async fn reindex<S>(State(service): State<Arc<S>>) -> Result<Json<IngestSummary>, AppError>
where
    S: ProcessingApi,
{
    let summary = service.reindex().await?;
    tracing::info!(
        pages = summary.pages,
        chunks = summary.chunks,
        "Index request completed"
    );
    Ok(Json(summary))
}

/// Request body for `POST /api/ask`.
#[derive(Deserialize)]
struct AskRequest {
    /// Question text.
    q: String,
    /// Optional number of chunks to retrieve (defaults to 5).
    #[serde(default)]
    k: Option<usize>,
}

/// Answer a question against the indexed corpus.
async fn ask<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, AppError>
where
    S: ProcessingApi,
{
    let k = request.k.unwrap_or(DEFAULT_TOP_K).max(1);
    let answer = service.ask(&request.q, k).await?;
    Ok(Json(answer))
}

/// Confirmation body returned by wipe and import.
#[derive(Serialize)]
struct ConfirmationResponse {
    message: String,
}

/// Delete and recreate the index.
async fn wipe<S>(State(service): State<Arc<S>>) -> Result<Json<ConfirmationResponse>, AppError>
where
    S: ProcessingApi,
{
    service.wipe().await?;
    Ok(Json(ConfirmationResponse {
        message: "Index wiped".into(),
    }))
}

/// Download the on-disk index as a zip archive.
async fn export<S>(State(service): State<Arc<S>>) -> Result<Response, AppError>
where
    S: ProcessingApi,
{
    let bytes = service.export_index().await?;
    let headers = [
        (header::CONTENT_TYPE, "application/zip"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"index_export.zip\"",
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// Destructively replace the index with an uploaded zip archive, sent as a
/// multipart `archive` field (`zip` is accepted as an alias).
async fn import<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<ConfirmationResponse>, AppError>
where
    S: ProcessingApi,
{
    let (filename, bytes) = read_file_field(multipart, &["archive", "zip"]).await?;
    if !filename.to_lowercase().ends_with(".zip") {
        return Err(AppError::BadRequest("A .zip archive is required".into()));
    }

    service.import_index(bytes).await?;
    Ok(Json(ConfirmationResponse {
        message: "Index imported; reindexing is not required".into(),
    }))
}

/// Return a concise metrics snapshot of pipeline counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: ProcessingApi,
{
    Json(service.metrics_snapshot())
}

/// Trivial liveness signal.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Pull the expected file field out of a multipart body. Fields under any
/// other name are skipped, whether or not they carry a filename.
async fn read_file_field(
    mut multipart: Multipart,
    expected_names: &[&str],
) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(format!("Malformed multipart body: {error}")))?
    {
        let is_expected = field
            .name()
            .is_some_and(|name| expected_names.contains(&name));
        if !is_expected {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::BadRequest("No file provided".into()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::BadRequest(format!("Failed to read upload: {error}")))?;
        return Ok((filename, bytes.to_vec()));
    }

    Err(AppError::BadRequest("No file provided".into()))
}

/// Error envelope translating pipeline failures into HTTP responses.
///
/// Input errors map to 400, remote-provider failures to 503 so repeated
/// outages surface as "service unavailable" rather than a generic fault, and
/// everything else to 500.
enum AppError {
    BadRequest(String),
    Ask(AskError),
    Processing(ProcessingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Ask(AskError::EmptyQuestion) => {
                (StatusCode::BAD_REQUEST, AskError::EmptyQuestion.to_string())
            }
            Self::Ask(error @ (AskError::Embedding(_) | AskError::Generation(_))) => {
                (StatusCode::SERVICE_UNAVAILABLE, error.to_string())
            }
            Self::Ask(error) => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
            Self::Processing(ProcessingError::NoSourceFiles) => (
                StatusCode::BAD_REQUEST,
                ProcessingError::NoSourceFiles.to_string(),
            ),
            Self::Processing(error @ ProcessingError::Embedding(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, error.to_string())
            }
            Self::Processing(error) => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AskError> for AppError {
    fn from(inner: AskError) -> Self {
        Self::Ask(inner)
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}
