//! IDE plugin download

use crate::{ApiError, AppState};
use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use diligent_core::DiligentError;
use std::io::ErrorKind;
use tracing::warn;

/// Download the packaged IDE plugin
#[utoipa::path(
    get,
    path = "/api/plugin/download",
    tag = "Plugin",
    responses(
        (status = 200, description = "Plugin archive", content_type = "application/zip"),
        (status = 404, description = "Plugin archive is not available")
    )
)]
pub async fn download_plugin(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let plugin = &state.settings.plugin;

    let archive = tokio::fs::read(&plugin.archive_path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            warn!("Plugin archive missing: {}", plugin.archive_path.display());
            ApiError::NotFound("Plugin archive".to_string())
        } else {
            ApiError::Storage(DiligentError::Io(e))
        }
    })?;

    Ok((
        [
            (CONTENT_TYPE, "application/zip".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", plugin.archive_name),
            ),
        ],
        archive,
    ))
}
