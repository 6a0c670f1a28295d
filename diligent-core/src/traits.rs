//! Collaborator interfaces the core depends on

use crate::error::DiligentResult;
use crate::types::{ConfigSummary, Configuration, NewConfiguration, User};
use async_trait::async_trait;

/// Persistence of user records
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> DiligentResult<Option<User>>;

    /// Insert `user` unless a record with the same username exists.
    ///
    /// Returns whichever record is stored after the call. Concurrent callers
    /// for the same username all observe the single winning record.
    async fn insert_user_if_absent(&self, user: User) -> DiligentResult<User>;
}

/// Persistence of check configurations
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn find_configs_by_creator(&self, creator: &str) -> DiligentResult<Vec<ConfigSummary>>;

    async fn find_config_by_id(&self, id: &str) -> DiligentResult<Option<Configuration>>;

    async fn find_config_by_title(
        &self,
        creator: &str,
        title: &str,
    ) -> DiligentResult<Option<ConfigSummary>>;

    /// Store a configuration and return its generated id
    async fn insert_config(&self, config: NewConfiguration) -> DiligentResult<String>;

    /// Returns whether a configuration was removed
    async fn delete_config_by_id(&self, id: &str) -> DiligentResult<bool>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token creation failed")]
    Creation,
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
    #[error("Invalid token type")]
    WrongType,
}

/// Bearer tokens keyed by username
pub trait SessionTokens: Send + Sync {
    fn issue(&self, username: &str) -> Result<String, TokenError>;

    /// Username the token was issued for
    fn validate(&self, token: &str) -> Result<String, TokenError>;
}
