use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use funda_core::models::grade::Grade;
use funda_core::models::message::Message;
use funda_core::models::session::{Session, SessionPatch};
use funda_core::models::subject::Subject;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateSession {
    pub grade: Grade,
    pub subject: Subject,
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSession>,
) -> Result<Json<Session>, ApiError> {
    let session = state.engine.create_session(body.grade, body.subject).await;
    Ok(Json(session))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let session = state.engine.get_session(&id).await?;
    Ok(Json(session))
}

pub async fn patch_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<SessionPatch>,
) -> Result<Json<Session>, ApiError> {
    let session = state.engine.patch_session(&id, patch).await?;
    Ok(Json(session))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    // Distinguish an unknown session from an empty history.
    state.engine.get_session(&id).await?;
    Ok(Json(state.engine.list_messages(&id).await))
}
