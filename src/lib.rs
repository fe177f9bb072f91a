//! Employee Registration
//!
//! Session state, validation and persistence for a small employee registration wizard, plus
//! the HTTP endpoint that mirrors the owners document.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod persistence;
pub mod state;
pub mod validation;
pub mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::{MemoryStore, SqliteStore};
use errors::AppError;
use persistence::{HttpMirror, PersistentStore};
use state::ApplicationState;
use workflow::WorkflowController;

/// State shared across the mirror endpoint handlers.
#[derive(Clone)]
pub struct MirrorState {
    pub mirror_file: Arc<PathBuf>,
    pub write_lock: Arc<Mutex<()>>,
}

impl MirrorState {
    pub fn new(mirror_file: PathBuf) -> Self {
        Self {
            mirror_file: Arc::new(mirror_file),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Create the mirror router.
pub fn create_router(state: MirrorState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            api::MIRROR_PATH,
            get(api::get_mirror).post(api::post_mirror),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Open local storage, load the owners collection and start a session controller.
///
/// The remote mirror is used only when `config.mirror_url` is set.
pub async fn open_session(config: &Config) -> Result<WorkflowController, AppError> {
    let pool = db::init_database(&config.db_path).await?;
    let mut persistence = PersistentStore::new(Arc::new(SqliteStore::new(pool)));

    if let Some(url) = &config.mirror_url {
        tracing::info!("Mirroring owners to {}", url);
        let mirror = HttpMirror::new(url.clone(), config.mirror_timeout)?;
        persistence = persistence.with_remote(Arc::new(mirror));
    }

    let state = ApplicationState::load(persistence).await?;
    Ok(WorkflowController::new(state, Arc::new(MemoryStore::new())))
}

#[cfg(test)]
mod tests;
