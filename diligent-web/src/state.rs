//! Shared application state

use crate::{auth::jwt::JwtService, WebConfig, WebError, WebResult};
use diligent_core::{
    directory::{FixtureDirectory, LdapDirectory},
    AuthorizationPolicy, ConfigStore, DiligentConfig, DirectoryBackend, DirectoryClient,
    LoginService, UserStore,
};
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "sqlite")]
use crate::database::SqliteStore;
#[cfg(not(feature = "sqlite"))]
use diligent_core::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: WebConfig,
    /// Backend configuration
    pub settings: Arc<DiligentConfig>,
    pub login: Arc<LoginService>,
    pub users: Arc<dyn UserStore>,
    pub configs: Arc<dyn ConfigStore>,
    pub tokens: Arc<JwtService>,
}

impl AppState {
    /// Build the state from configuration: directory backend, store, and
    /// token service
    pub async fn new(config: WebConfig, settings: DiligentConfig) -> WebResult<Self> {
        let directory = build_directory(&settings)?;

        #[cfg(feature = "sqlite")]
        let store = SqliteStore::connect(&settings.storage.database_url).await?;

        #[cfg(not(feature = "sqlite"))]
        let store = {
            tracing::warn!("Built without sqlite support, data is kept in memory only");
            MemoryStore::new()
        };

        Ok(Self::with_parts(config, settings, directory, store))
    }

    /// Assemble the state from an existing directory client and store
    pub fn with_parts<S>(
        config: WebConfig,
        settings: DiligentConfig,
        directory: Arc<dyn DirectoryClient>,
        store: S,
    ) -> Self
    where
        S: UserStore + ConfigStore + Clone + 'static,
    {
        let users: Arc<dyn UserStore> = Arc::new(store.clone());
        let configs: Arc<dyn ConfigStore> = Arc::new(store);

        let login = LoginService::new(directory, AuthorizationPolicy::default(), users.clone());
        let tokens = JwtService::new(&settings.session);

        Self {
            config,
            settings: Arc::new(settings),
            login: Arc::new(login),
            users,
            configs,
            tokens: Arc::new(tokens),
        }
    }
}

fn build_directory(settings: &DiligentConfig) -> WebResult<Arc<dyn DirectoryClient>> {
    let directory = &settings.directory;

    match directory.backend {
        DirectoryBackend::Ldap => {
            info!("Using LDAP directory at {}", directory.url);
            Ok(Arc::new(LdapDirectory::new(directory)))
        }
        DirectoryBackend::Fixture => {
            let path = directory.fixture_path.as_ref().ok_or_else(|| {
                WebError::Config("directory.fixture_path is required".to_string())
            })?;
            info!("Using fixture directory from {}", path.display());
            let fixture = FixtureDirectory::from_file(path)
                .map_err(|e| WebError::Directory(e.to_string()))?;
            Ok(Arc::new(fixture))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_from_default_settings() {
        let state = AppState::new(WebConfig::default(), DiligentConfig::default())
            .await
            .unwrap();

        assert!(state.users.find_user_by_username("jdoe").await.unwrap().is_none());
        assert!(state.configs.find_configs_by_creator("jdoe").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fixture_file_is_reported() {
        let mut settings = DiligentConfig::default();
        settings.directory.backend = DirectoryBackend::Fixture;
        settings.directory.fixture_path = Some("/nonexistent/users.json".into());

        let result = AppState::new(WebConfig::default(), settings).await;
        assert!(matches!(result, Err(WebError::Directory(_))));
    }
}
