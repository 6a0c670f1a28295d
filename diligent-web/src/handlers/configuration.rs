//! Check configuration handlers

use super::types::{
    ConfigChecksResponse, ConfigListItem, DeleteConfigResponse, NewConfigRequest,
    NewConfigResponse, PluginChecksResponse, ServerTimeResponse,
};
use crate::{auth::AuthenticatedUser, ApiError, AppState};
use axum::{
    extract::{Path, State},
    response::Json,
};
use diligent_core::{
    checks::{is_known_check, PluginChecks},
    ConfigStore, NewConfiguration, Priority,
};
use tracing::{debug, info};

/// Current server time
#[utoipa::path(
    get,
    path = "/api/configuration/server_time",
    tag = "Configuration",
    responses(
        (status = 200, description = "Server time in epoch milliseconds", body = ServerTimeResponse)
    )
)]
pub async fn server_time() -> Json<ServerTimeResponse> {
    Json(ServerTimeResponse {
        time: chrono::Utc::now().timestamp_millis(),
    })
}

/// Store a new configuration for the caller
#[utoipa::path(
    post,
    path = "/api/configuration/new_config",
    tag = "Configuration",
    request_body = NewConfigRequest,
    responses(
        (status = 200, description = "Configuration stored", body = NewConfigResponse),
        (status = 400, description = "Empty title or unknown check"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 409, description = "Caller already has a configuration with this title")
    ),
    security(("bearer" = []))
)]
pub async fn new_config(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<NewConfigRequest>,
) -> Result<Json<NewConfigResponse>, ApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title must not be empty".to_string()));
    }

    for priority in Priority::ALL {
        if let Some(unknown) = request
            .checks(priority)
            .iter()
            .find(|selection| !is_known_check(&selection.check))
        {
            return Err(ApiError::Validation(format!(
                "Unknown check '{}'",
                unknown.check
            )));
        }
    }

    if state
        .configs
        .find_config_by_title(&user.username, title)
        .await?
        .is_some()
    {
        debug!(username = %user.username, title, "Duplicate configuration title");
        return Err(ApiError::DuplicateTitle(title.to_string()));
    }

    let config = NewConfiguration {
        title: title.to_string(),
        creator: user.username.clone(),
        high: request.high.into_iter().map(Into::into).collect(),
        medium: request.medium.into_iter().map(Into::into).collect(),
        low: request.low.into_iter().map(Into::into).collect(),
        course_code: request.course_code,
        exercise_num: request.exercise_num,
    };

    let id = state.configs.insert_config(config).await?;

    info!(username = %user.username, config_id = %id, "Configuration created");
    Ok(Json(NewConfigResponse { success: true, id }))
}

/// Configurations created by the caller
#[utoipa::path(
    get,
    path = "/api/configuration/get_my_configs",
    tag = "Configuration",
    responses(
        (status = 200, description = "The caller's configurations", body = Vec<ConfigListItem>),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer" = []))
)]
pub async fn get_my_configs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ConfigListItem>>, ApiError> {
    let configs = state.configs.find_configs_by_creator(&user.username).await?;

    Ok(Json(configs.into_iter().map(ConfigListItem::from).collect()))
}

/// Check ids of a configuration, for editing in the UI
#[utoipa::path(
    get,
    path = "/api/configuration/get_checks/{config_id}",
    tag = "Configuration",
    params(
        ("config_id" = String, Path, description = "Configuration ID")
    ),
    responses(
        (status = 200, description = "Configuration checks", body = ConfigChecksResponse),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Configuration not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_checks(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(config_id): Path<String>,
) -> Result<Json<ConfigChecksResponse>, ApiError> {
    let config = state
        .configs
        .find_config_by_id(&config_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Configuration {}", config_id)))?;

    Ok(Json(config.into()))
}

/// Inspection names of a configuration, for the IDE plugin
#[utoipa::path(
    get,
    path = "/api/configuration/get_checks_for_download/{config_id}",
    tag = "Configuration",
    params(
        ("config_id" = String, Path, description = "Configuration ID")
    ),
    responses(
        (status = 200, description = "Inspections per priority", body = PluginChecksResponse),
        (status = 404, description = "Configuration not found")
    )
)]
pub async fn get_checks_for_download(
    State(state): State<AppState>,
    Path(config_id): Path<String>,
) -> Result<Json<PluginChecksResponse>, ApiError> {
    let config = state
        .configs
        .find_config_by_id(&config_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Configuration {}", config_id)))?;

    let checks = PluginChecks::from_configuration(&config);
    let names = |names: Vec<&'static str>| -> Vec<String> {
        names.into_iter().map(String::from).collect()
    };

    Ok(Json(PluginChecksResponse {
        high: names(checks.high),
        medium: names(checks.medium),
        low: names(checks.low),
    }))
}

/// Delete one of the caller's configurations
#[utoipa::path(
    delete,
    path = "/api/configuration/{config_id}",
    tag = "Configuration",
    params(
        ("config_id" = String, Path, description = "Configuration ID")
    ),
    responses(
        (status = 200, description = "Configuration deleted", body = DeleteConfigResponse),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "No such configuration owned by the caller")
    ),
    security(("bearer" = []))
)]
pub async fn delete_config(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(config_id): Path<String>,
) -> Result<Json<DeleteConfigResponse>, ApiError> {
    let owned = state
        .configs
        .find_config_by_id(&config_id)
        .await?
        .is_some_and(|config| config.creator == user.username);

    // Someone else's configuration looks exactly like a missing one
    if !owned || !state.configs.delete_config_by_id(&config_id).await? {
        return Err(ApiError::NotFound(format!("Configuration {}", config_id)));
    }

    info!(username = %user.username, config_id = %config_id, "Configuration deleted");
    Ok(Json(DeleteConfigResponse { deleted: true }))
}
