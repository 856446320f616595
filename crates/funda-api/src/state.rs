use std::sync::Arc;

use funda_bedrock::chat::BedrockTutor;
use funda_engine::engine::TutorEngine;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TutorEngine<BedrockTutor>>,
    /// Kept alongside the engine for the document extraction path,
    /// which builds its own runtime client.
    pub aws_config: aws_config::SdkConfig,
    pub model_id: String,
}
