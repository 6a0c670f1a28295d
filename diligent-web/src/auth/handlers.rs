//! Login, user info, and token refresh handlers

use super::{
    jwt::{AccessToken, AuthError, TokenPair},
    AuthenticatedUser, RefreshIdentity,
};
use crate::AppState;
use axum::{extract::State, response::Json};
use diligent_core::{Credentials, LoginError, UserStore};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

/// Login form as posted by the frontend
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "jdoe")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Profile of the logged-in user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfoResponse {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub is_student: bool,
}

/// Authenticate against the directory and open a session
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = TokenPair),
        (status = 401, description = "Login failed")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let credentials = Credentials::new(&request.username, &request.password);

    let outcome = state
        .login
        .login(&credentials)
        .await
        .map_err(|e| match e {
            LoginError::AuthenticationFailed | LoginError::DirectoryUnavailable(_) => {
                AuthError::InvalidCredentials
            }
            LoginError::Storage(err) => {
                err.log();
                AuthError::Internal(err.to_string())
            }
        })?;

    let tokens = state.tokens.generate_token_pair(&outcome.user.username)?;

    info!(username = %outcome.user.username, "Session opened");
    Ok(Json(tokens))
}

/// Profile of the caller
#[utoipa::path(
    get,
    path = "/api/userinfo",
    tag = "Auth",
    responses(
        (status = 200, description = "Stored user record", body = UserInfoResponse),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer" = []))
)]
pub async fn user_info(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserInfoResponse>, AuthError> {
    let record = state
        .users
        .find_user_by_username(&user.username)
        .await
        .map_err(|e| {
            error!(username = %user.username, error = %e, "Failed to load user record");
            AuthError::Internal(e.to_string())
        })?
        .ok_or(AuthError::UnknownUser)?;

    Ok(Json(UserInfoResponse {
        firstname: record.firstname,
        lastname: record.surname,
        username: record.username,
        is_student: record.is_student,
    }))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/token/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 401, description = "Missing or invalid refresh token")
    ),
    security(("bearer" = []))
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    identity: RefreshIdentity,
) -> Result<Json<AccessToken>, AuthError> {
    let access_token = state.tokens.generate_access_token(&identity.username)?;

    info!(username = %identity.username, "Access token refreshed");
    Ok(Json(AccessToken { access_token }))
}
