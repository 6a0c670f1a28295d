//! JWT session tokens

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use diligent_core::{SessionConfig, SessionTokens, TokenError};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use utoipa::ToSchema;

/// JWT signing and verification keys
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl Claims {
    fn new(username: &str, token_type: TokenType, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_type,
        }
    }
}

/// Tokens handed out on login
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token handed out on refresh
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub access_token: String,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Every failed login, whatever the cause
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Malformed authorization header")]
    MalformedAuthHeader,
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Valid token for a user without a stored record
    #[error("Unknown user")]
    UnknownUser,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            // The login form only checks for a truthy `error`
            AuthError::InvalidCredentials => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": true,
                        "message": "Invalid username or password",
                    })),
                )
                    .into_response();
            }
            AuthError::MissingAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "missing_auth_header",
                "Authorization header is required",
            ),
            AuthError::MalformedAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Expected a bearer token",
            ),
            AuthError::Token(TokenError::Creation) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_creation_failed",
                "Failed to create authentication token",
            ),
            AuthError::Token(TokenError::Invalid) => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or malformed token",
            ),
            AuthError::Token(TokenError::Expired) => (
                StatusCode::UNAUTHORIZED,
                "token_expired",
                "Token has expired",
            ),
            AuthError::Token(TokenError::WrongType) => (
                StatusCode::UNAUTHORIZED,
                "invalid_token_type",
                "Invalid token type for this operation",
            ),
            AuthError::UnknownUser => (
                StatusCode::UNAUTHORIZED,
                "unknown_user",
                "No record exists for this user",
            ),
            AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        };

        let body = Json(json!({
            "error": error_code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Issues and verifies session tokens with a shared secret
pub struct JwtService {
    keys: Keys,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            keys: Keys::new(config.secret.as_bytes()),
            access_ttl: ttl(config.access_token_ttl_secs),
            refresh_ttl: ttl(config.refresh_token_ttl_secs),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.keys.encoding).map_err(|e| {
            warn!("Failed to encode JWT token: {}", e);
            TokenError::Creation
        })
    }

    pub fn generate_access_token(&self, username: &str) -> Result<String, TokenError> {
        self.sign(&Claims::new(username, TokenType::Access, self.access_ttl))
    }

    pub fn generate_refresh_token(&self, username: &str) -> Result<String, TokenError> {
        self.sign(&Claims::new(username, TokenType::Refresh, self.refresh_ttl))
    }

    pub fn generate_token_pair(&self, username: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(username)?,
            refresh_token: self.generate_refresh_token(username)?,
        })
    }

    /// Verify signature, expiry, and token type
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.keys.decoding, &validation)
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?
            .claims;

        if claims.token_type != expected {
            return Err(TokenError::WrongType);
        }

        Ok(claims)
    }
}

impl SessionTokens for JwtService {
    fn issue(&self, username: &str) -> Result<String, TokenError> {
        self.generate_access_token(username)
    }

    fn validate(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token, TokenType::Access).map(|claims| claims.sub)
    }
}

/// Token lifetimes are capped at ten years
const MAX_TTL_SECS: u64 = 60 * 60 * 24 * 365 * 10;

fn ttl(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}
