//! Liveness endpoint

use super::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, response::Json};

/// Report that the server is up and which directory backend it logs in against.
///
/// Never contacts the directory itself.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        directory: state.settings.directory.backend,
    })
}
