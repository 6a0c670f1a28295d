//! Configuration management

use crate::error::{DiligentError, DiligentResult, ErrorContext};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiligentConfig {
    pub directory: DirectoryConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub plugin: PluginConfig,
    pub logging: LoggingConfig,
}

/// Which directory implementation serves logins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryBackend {
    Ldap,
    Fixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub backend: DirectoryBackend,
    pub url: String,
    pub base_dn: String,
    /// Bind principal with a `{username}` placeholder
    pub bind_template: String,
    pub connect_timeout_secs: u64,
    pub operation_timeout_secs: u64,
    /// JSON fixture used by the fixture backend
    pub fixture_path: Option<PathBuf>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            backend: DirectoryBackend::Ldap,
            url: "ldaps://ldaps-vip.cc.ic.ac.uk:636".to_string(),
            base_dn: "OU=Users,OU=Imperial College (London),DC=ic,DC=ac,DC=uk".to_string(),
            bind_template: "{username}@IC.AC.UK".to_string(),
            connect_timeout_secs: 10,
            operation_timeout_secs: 10,
            fixture_path: None,
        }
    }
}

/// Token signing secret used when none is configured
pub const DEV_SESSION_SECRET: &str = "diligent-dev-secret-change-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SESSION_SECRET.to_string(),
            access_token_ttl_secs: 60 * 60 * 24,
            refresh_token_ttl_secs: 60 * 60 * 24 * 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub archive_path: PathBuf,
    /// File name offered to the browser
    pub archive_name: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("plugin/diligent-1.0.0.zip"),
            archive_name: "diligent-1.0.0.zip".to_string(),
        }
    }
}

impl DiligentConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DiligentResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DiligentError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: DiligentConfig = toml::from_str(&content).map_err(|e| DiligentError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DiligentResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| DiligentError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| DiligentError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> DiligentResult<()> {
        let directory = &self.directory;

        match directory.backend {
            DirectoryBackend::Ldap => {
                if directory.url.trim().is_empty() {
                    return Err(invalid("directory.url must not be empty", "Set directory.url"));
                }
                if directory.base_dn.trim().is_empty() {
                    return Err(invalid(
                        "directory.base_dn must not be empty",
                        "Set directory.base_dn",
                    ));
                }
                if !directory.bind_template.contains("{username}") {
                    return Err(invalid(
                        "directory.bind_template must contain {username}",
                        "Use a template such as {username}@EXAMPLE.ORG",
                    ));
                }
            }
            DirectoryBackend::Fixture => {
                if directory.fixture_path.is_none() {
                    return Err(invalid(
                        "directory.fixture_path is required for the fixture backend",
                        "Point directory.fixture_path at a JSON fixture",
                    ));
                }
            }
        }

        if directory.connect_timeout_secs == 0 || directory.operation_timeout_secs == 0 {
            return Err(invalid(
                "Directory timeouts must be greater than 0",
                "Set directory.connect_timeout_secs and directory.operation_timeout_secs",
            ));
        }

        if self.session.secret.is_empty() {
            return Err(invalid("session.secret must not be empty", "Set session.secret"));
        }

        if self.session.access_token_ttl_secs == 0 || self.session.refresh_token_ttl_secs == 0 {
            return Err(invalid(
                "Token lifetimes must be greater than 0",
                "Set session.access_token_ttl_secs and session.refresh_token_ttl_secs",
            ));
        }

        if self.storage.database_url.trim().is_empty() {
            return Err(invalid(
                "storage.database_url must not be empty",
                "Set storage.database_url or DATABASE_URL",
            ));
        }

        Ok(())
    }

    /// Real directory logins signed with the secret shipped in the source
    pub fn uses_dev_secret_in_production(&self) -> bool {
        self.directory.backend == DirectoryBackend::Ldap
            && self.session.secret == DEV_SESSION_SECRET
    }
}

fn invalid(message: &str, suggestion: &str) -> DiligentError {
    DiligentError::Config {
        message: message.to_string(),
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    }
}
