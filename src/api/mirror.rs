//! Mirror endpoints: a plain file passthrough for the owners document.

use std::io::ErrorKind;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{MirrorPayload, OwnersDocument, SyncReceipt};
use crate::MirrorState;

/// GET /employee-registration/data/owners.json - Return the stored document verbatim.
pub async fn get_mirror(State(state): State<MirrorState>) -> Result<Response, AppError> {
    match tokio::fs::read_to_string(state.mirror_file.as_path()).await {
        Ok(content) => Ok(([(header::CONTENT_TYPE, "application/json")], content).into_response()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound(
            "No owners have been mirrored yet".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// POST /employee-registration/data/owners.json - Replace the stored document.
pub async fn post_mirror(
    State(state): State<MirrorState>,
    Json(payload): Json<MirrorPayload>,
) -> ApiResult<SyncReceipt> {
    let document = OwnersDocument::from(payload);
    let content = serde_json::to_string_pretty(&document)?;

    let path = state.mirror_file.as_path();
    let tmp_path = path.with_extension("json.tmp");

    // Serialize writers so the rename never races another write.
    let _guard = state.write_lock.lock().await;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&tmp_path, content).await?;
    tokio::fs::rename(&tmp_path, path).await?;

    tracing::info!("Mirrored {} owners to {:?}", document.owners.len(), path);
    success(SyncReceipt {
        owner_count: document.owners.len(),
    })
}
