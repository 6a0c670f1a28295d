//! Route definitions for the Diligent web server

use crate::{auth, handlers, openapi, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        // Authentication
        .route("/login", post(auth::handlers::login))
        .route("/userinfo", get(auth::handlers::user_info))
        .route("/token/refresh", post(auth::handlers::refresh_token))
        // Check configurations
        .nest("/configuration", configuration_routes())
        // IDE plugin
        .route("/plugin/download", get(handlers::download_plugin))
}

fn configuration_routes() -> Router<AppState> {
    Router::new()
        .route("/server_time", get(handlers::server_time))
        .route("/new_config", post(handlers::new_config))
        .route("/get_my_configs", get(handlers::get_my_configs))
        .route("/get_checks/{config_id}", get(handlers::get_checks))
        .route(
            "/get_checks_for_download/{config_id}",
            get(handlers::get_checks_for_download),
        )
        .route("/{config_id}", delete(handlers::delete_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebConfig;
    use axum::http::StatusCode;
    use diligent_core::{directory::FixtureDirectory, DiligentConfig, MemoryStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::with_parts(
            WebConfig::default(),
            DiligentConfig::default(),
            Arc::new(FixtureDirectory::default()),
            MemoryStore::new(),
        )
    }

    #[tokio::test]
    async fn test_health_check_route() {
        let app = api_routes().with_state(state());

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_server_time_is_not_shadowed_by_delete_route() {
        let app = api_routes().with_state(state());

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/configuration/server_time")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
