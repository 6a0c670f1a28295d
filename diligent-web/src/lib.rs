//! Diligent Web Server
//!
//! HTTP backend for the Diligent configuration UI and IDE plugin: directory
//! login, session tokens, and storage of check configurations.

pub mod auth;
#[cfg(feature = "sqlite")]
pub mod database;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use server::DiligentServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use diligent_core::DiligentConfig;
use std::path::PathBuf;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // The dev server of the frontend runs on its own port
    if state.config.dev_mode {
        cors = cors.allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ]);
    }

    let router = Router::new().nest("/api", routes::api_routes());

    // Frontend routes (SPA fallback)
    let router = match &state.config.static_dir {
        Some(static_dir) => {
            let index = PathBuf::from(static_dir).join("index.html");
            router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
        }
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Built frontend to serve next to the API
    pub static_dir: Option<String>,
    /// TOML file with the backend configuration
    pub config_path: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            dev_mode: false,
            static_dir: None,
            config_path: None,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("DILIGENT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("DILIGENT_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(5000),
            dev_mode: std::env::var("DILIGENT_DEV_MODE")
                .ok()
                .and_then(|flag| flag.parse().ok())
                .unwrap_or(false),
            static_dir: std::env::var("DILIGENT_STATIC_DIR").ok(),
            config_path: std::env::var("DILIGENT_CONFIG").ok(),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Read the backend configuration and apply secrets from the environment.
    ///
    /// `DILIGENT_JWT_SECRET` replaces `session.secret` and `DATABASE_URL`
    /// replaces `storage.database_url`.
    pub fn load_settings(&self) -> WebResult<DiligentConfig> {
        let mut settings = match &self.config_path {
            Some(path) => {
                DiligentConfig::from_file(path).map_err(|e| WebError::Config(e.to_string()))?
            }
            None => DiligentConfig::default(),
        };

        if let Ok(secret) = std::env::var("DILIGENT_JWT_SECRET") {
            settings.session.secret = secret;
        }
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            settings.storage.database_url = database_url;
        }

        settings
            .validate()
            .map_err(|e| WebError::Config(e.to_string()))?;

        if settings.uses_dev_secret_in_production() {
            tracing::warn!(
                "Signing session tokens with the built-in development secret; set DILIGENT_JWT_SECRET"
            );
        }

        Ok(settings)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "diligent_web=debug,diligent_core=debug,tower_http=debug".into()
            }),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_config_defaults() {
        let config = WebConfig::default();
        assert_eq!(config.address(), "127.0.0.1:5000");
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_load_settings_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diligent.toml");
        std::fs::write(&path, "[directory]\nbackend = \"fixture\"\n").unwrap();

        let config = WebConfig {
            config_path: Some(path.display().to_string()),
            ..WebConfig::default()
        };

        assert!(matches!(config.load_settings(), Err(WebError::Config(_))));
    }
}
