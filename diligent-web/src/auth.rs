//! Session authentication for the HTTP API
//!
//! Logins go through the directory once; afterwards the client presents a
//! bearer token. Access tokens authorize API calls, refresh tokens only mint
//! new access tokens.

pub mod handlers;
pub mod jwt;

use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jwt::{AuthError, TokenType};
use tracing::debug;

/// Caller identified by a valid access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Caller identified by a valid refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshIdentity {
    pub username: String,
}

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedAuthHeader)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MalformedAuthHeader)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify(token, TokenType::Access)?;

        debug!(username = %claims.sub, "Authenticated request");
        Ok(Self {
            username: claims.sub,
        })
    }
}

impl<S> FromRequestParts<S> for RefreshIdentity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify(token, TokenType::Refresh)?;

        Ok(Self {
            username: claims.sub,
        })
    }
}
