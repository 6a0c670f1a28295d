//! Responses shared by the small system endpoints

use diligent_core::DirectoryBackend;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Directory backend logins are checked against
    #[schema(value_type = String, example = "ldap")]
    pub directory: DirectoryBackend,
}

/// Current server time
#[derive(Debug, Serialize, ToSchema)]
pub struct ServerTimeResponse {
    /// Milliseconds since the Unix epoch
    #[schema(example = 1700000000000_i64)]
    pub time: i64,
}
