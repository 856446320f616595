use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use funda_bedrock::chat::BedrockTutor;
use funda_engine::config::TutorConfig;
use funda_engine::engine::TutorEngine;
use funda_store::conversations::ConversationStore;
use funda_store::documents::DocumentIndex;
use funda_store::snapshot::{self, StoreSnapshot};

mod error;
mod routes;
mod state;

use state::AppState;

const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let model_id = env::var("FUNDA_MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
    let bind_addr = env::var("FUNDA_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let snapshot_path = env::var("FUNDA_SNAPSHOT").ok().map(PathBuf::from);

    let (store, index) = match load_snapshot(snapshot_path.as_deref())? {
        Some(snapshot) => {
            let (store, index) = snapshot::restore(snapshot);
            (Arc::new(store), Arc::new(index))
        }
        None => (
            Arc::new(ConversationStore::new()),
            Arc::new(DocumentIndex::new()),
        ),
    };

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let tutor = BedrockTutor::new(&aws_config, model_id.clone());

    let engine = Arc::new(TutorEngine::new(
        Arc::clone(&store),
        Arc::clone(&index),
        tutor,
        TutorConfig::default(),
    ));
    let state = AppState {
        engine,
        aws_config,
        model_id,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/sessions", post(routes::sessions::create_session))
        .route("/sessions/{id}", get(routes::sessions::get_session))
        .route("/sessions/{id}", patch(routes::sessions::patch_session))
        .route(
            "/sessions/{id}/messages",
            get(routes::sessions::list_messages),
        )
        .route("/chat", post(routes::chat::send_message))
        .route("/quick-action", post(routes::chat::quick_action))
        .route("/curriculum", get(routes::curriculum::list_documents))
        .route("/curriculum", post(routes::curriculum::upload_document))
        .route(
            "/curriculum/{id}",
            delete(routes::curriculum::deactivate_document),
        )
        .layer(cors)
        .with_state(state);

    tracing::info!(%bind_addr, "starting server");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(path) = &snapshot_path {
        let snapshot = snapshot::take(&store, &index).await;
        std::fs::write(path, snapshot.to_json()?)?;
        tracing::info!(path = %path.display(), "wrote store snapshot");
    }

    Ok(())
}

/// Read and parse the snapshot file, if one is configured and present.
/// A missing file starts empty; a corrupt file aborts startup rather
/// than silently losing it.
fn load_snapshot(path: Option<&std::path::Path>) -> eyre::Result<Option<StoreSnapshot>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    let snapshot = StoreSnapshot::from_json(&bytes)?;
    tracing::info!(
        path = %path.display(),
        sessions = snapshot.sessions.len(),
        documents = snapshot.documents.len(),
        "restored store snapshot"
    );
    Ok(Some(snapshot))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
}
