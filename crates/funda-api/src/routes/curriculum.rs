use axum::Json;
use axum::extract::{Path, Query, State};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::warn;

use funda_bedrock::extract;
use funda_core::models::curriculum::CurriculumDocument;
use funda_core::models::grade::Grade;
use funda_core::models::subject::Subject;
use funda_engine::engine::RegisterDocument;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CurriculumFilter {
    pub grade: Option<Grade>,
    pub subject: Option<Subject>,
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(filter): Query<CurriculumFilter>,
) -> Result<Json<Vec<CurriculumDocument>>, ApiError> {
    let filter = match (filter.grade, filter.subject) {
        (Some(grade), Some(subject)) => Some((grade, subject)),
        (None, None) => None,
        _ => {
            return Err(ApiError::BadRequest(
                "grade and subject must be given together".to_string(),
            ));
        }
    };
    Ok(Json(state.engine.list_curriculum(filter).await))
}

#[derive(Deserialize)]
pub struct UploadDocument {
    pub file_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub grade: Grade,
    pub subject: Subject,
    #[serde(default)]
    pub description: Option<String>,
    /// Base64-encoded file content. Text is extracted server-side;
    /// formats without extraction support get a placeholder.
    pub content_base64: String,
}

pub async fn upload_document(
    State(state): State<AppState>,
    Json(body): Json<UploadDocument>,
) -> Result<Json<CurriculumDocument>, ApiError> {
    let bytes = BASE64
        .decode(&body.content_base64)
        .map_err(|e| ApiError::BadRequest(format!("invalid base64 content: {e}")))?;

    let extracted_text = extract_text(&state, &bytes, &body).await;

    let document = state
        .engine
        .register_document(RegisterDocument {
            file_name: body.file_name,
            original_name: body.original_name,
            mime_type: body.mime_type,
            size_bytes: bytes.len() as u64,
            grade: body.grade,
            subject: body.subject,
            description: body.description,
            extracted_text,
        })
        .await;

    Ok(Json(document))
}

/// Best-effort extraction; `None` makes the engine record a placeholder.
async fn extract_text(state: &AppState, bytes: &[u8], body: &UploadDocument) -> Option<String> {
    if body.mime_type == "text/plain" {
        return Some(String::from_utf8_lossy(bytes).into_owned());
    }

    let format = extract::document_format_for_mime(&body.mime_type)?;
    match extract::extract_document_text(
        &state.aws_config,
        &state.model_id,
        bytes,
        &body.original_name,
        format,
    )
    .await
    {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(original_name = %body.original_name, error = %e, "text extraction failed");
            None
        }
    }
}

#[derive(Serialize)]
pub struct Deactivated {
    pub deactivated: bool,
}

pub async fn deactivate_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deactivated>, ApiError> {
    if !state.engine.deactivate_document(id).await {
        return Err(ApiError::NotFound(format!("unknown document: {id}")));
    }
    Ok(Json(Deactivated { deactivated: true }))
}
