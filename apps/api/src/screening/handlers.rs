//! Axum route handlers for the Screening API.

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::StructuredResult;
use crate::screening::batch::{
    extract_batch, screen_batch, ExtractionReport, ResumeDocument, ScreeningOutcome,
};
use crate::screening::models::JobRequirements;
use crate::screening::pipeline::PipelineResult;
use crate::screening::text_extract::extract_text;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_requirements: JobRequirements,
}

#[derive(Debug, Deserialize)]
pub struct BatchScreenRequest {
    pub resumes: Vec<ResumeDocument>,
    #[serde(default)]
    pub job_requirements: JobRequirements,
}

#[derive(Debug, Serialize)]
pub struct BatchScreenResponse {
    pub results: Vec<ScreeningOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub resumes: Vec<ResumeDocument>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_name: String,
    pub result: StructuredResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screenings
///
/// Parses one resume and scores it against the job requirements.
/// Answers 200 with the pipeline's own status body, including stage failures.
pub async fn handle_screen(
    State(state): State<AppState>,
    Json(request): Json<ScreenRequest>,
) -> Result<Json<PipelineResult>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let result = state
        .pipeline
        .run(&request.resume_text, &request.job_requirements)
        .await;

    Ok(Json(result))
}

/// POST /api/v1/screenings/batch
pub async fn handle_screen_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchScreenRequest>,
) -> Result<Json<BatchScreenResponse>, AppError> {
    if request.resumes.is_empty() {
        return Err(AppError::Validation("resumes cannot be empty".to_string()));
    }

    let results = screen_batch(&state.pipeline, request.resumes, &request.job_requirements).await;

    Ok(Json(BatchScreenResponse { results }))
}

/// POST /api/v1/resumes/extract
///
/// Resume filter: parse-only extraction into flat rows with summary statistics.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractionReport>, AppError> {
    if request.resumes.is_empty() {
        return Err(AppError::Validation("resumes cannot be empty".to_string()));
    }

    Ok(Json(extract_batch(&state.pipeline, request.resumes).await))
}

/// POST /api/v1/resumes/upload/:file_name
///
/// Raw file body (PDF or text). Extracts the text, then runs the parsing stage.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("request body cannot be empty".to_string()));
    }

    let name = file_name.clone();
    let resume_text = tokio::task::spawn_blocking(move || extract_text(&name, &body))
        .await
        .map_err(|e| AppError::Internal(anyhow!("text extraction task failed: {e}")))??;

    let result = state.pipeline.parse_resume(&resume_text).await;
    if !result.is_success() {
        warn!("{}: {}", file_name, result.error_message().unwrap_or_default());
    }

    Ok(Json(UploadResponse { file_name, result }))
}
