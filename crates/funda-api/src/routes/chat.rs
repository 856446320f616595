use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use funda_bedrock::prompt::QuickActionKind;
use funda_core::models::grade::Grade;
use funda_core::models::message::{MediaRef, Message};
use funda_core::models::subject::Subject;
use funda_engine::engine::TurnRequest;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatBody {
    pub session_id: String,
    #[serde(default)]
    pub message: String,
    pub grade: Grade,
    pub subject: Subject,
    #[serde(default)]
    pub media: Option<MediaRef>,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub response: String,
    pub message: Message,
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let outcome = state
        .engine
        .send_turn(TurnRequest {
            session_id: body.session_id,
            message: body.message,
            grade: body.grade,
            subject: body.subject,
            media: body.media,
        })
        .await?;

    Ok(Json(ChatReply {
        response: outcome.response,
        message: outcome.message,
    }))
}

#[derive(Deserialize)]
pub struct QuickActionBody {
    pub session_id: String,
    pub action: QuickActionKind,
    pub last_topic: String,
    pub grade: Grade,
    pub subject: Subject,
}

#[derive(Serialize)]
pub struct QuickActionReply {
    pub response: String,
}

pub async fn quick_action(
    State(state): State<AppState>,
    Json(body): Json<QuickActionBody>,
) -> Result<Json<QuickActionReply>, ApiError> {
    let response = state
        .engine
        .quick_action(
            body.action,
            &body.session_id,
            &body.last_topic,
            body.grade,
            body.subject,
        )
        .await?;

    Ok(Json(QuickActionReply { response }))
}
