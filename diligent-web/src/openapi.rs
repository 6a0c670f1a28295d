//! OpenAPI specification for the Diligent web server

use axum::response::Json;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::auth::{
    handlers::{LoginRequest, UserInfoResponse},
    jwt::{AccessToken, TokenPair},
};
use crate::handlers::{
    CheckSelection, ConfigChecksResponse, ConfigListItem, DeleteConfigResponse, HealthResponse,
    NewConfigRequest, NewConfigResponse, PluginChecksResponse, ServerTimeResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Diligent API",
        version = "0.1.0",
        description = "Directory login and check configurations for the Diligent IDE plugin",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,

        crate::auth::handlers::login,
        crate::auth::handlers::user_info,
        crate::auth::handlers::refresh_token,

        crate::handlers::server_time,
        crate::handlers::new_config,
        crate::handlers::get_my_configs,
        crate::handlers::get_checks,
        crate::handlers::get_checks_for_download,
        crate::handlers::delete_config,

        crate::handlers::download_plugin,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            TokenPair,
            AccessToken,
            UserInfoResponse,
            ServerTimeResponse,
            CheckSelection,
            NewConfigRequest,
            NewConfigResponse,
            ConfigListItem,
            ConfigChecksResponse,
            PluginChecksResponse,
            DeleteConfigResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Directory login and session tokens"),
        (name = "Configuration", description = "Check configurations"),
        (name = "Plugin", description = "IDE plugin distribution"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Bearer token security scheme
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Get the OpenAPI specification as JSON
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
