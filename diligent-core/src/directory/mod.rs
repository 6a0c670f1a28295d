//! Directory service access
//!
//! One login attempt is one transaction against the directory: bind with the
//! user's credentials, then read a fixed set of attributes for that account.

pub mod attributes;
pub mod fixture;
pub mod ldap;

pub use attributes::{normalize_attributes, AttributeValue, DirectoryAttributes, GroupedAttribute};
pub use fixture::FixtureDirectory;
pub use ldap::LdapDirectory;

use crate::types::Credentials;
use async_trait::async_trait;

/// Job title, used to tell students from staff
pub const TITLE: &str = "extensionAttribute6";
pub const GIVEN_NAME: &str = "givenName";
pub const SURNAME: &str = "sn";
pub const DISTINGUISHED_NAME: &str = "distinguishedName";
pub const MEMBERSHIPS: &str = "memberOf";

/// Attributes requested on login, in request order
pub const LOGIN_ATTRIBUTES: [&str; 5] = [TITLE, GIVEN_NAME, SURNAME, DISTINGUISHED_NAME, MEMBERSHIPS];

/// Attributes whose values are parsed into `KEY=value` groups
pub const GROUPED_ATTRIBUTES: [&str; 2] = [DISTINGUISHED_NAME, MEMBERSHIPS];

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no directory entry for the bound account")]
    NotFound,
    #[error("directory connection failed: {0}")]
    Connection(String),
}

/// Authenticated attribute lookup against a directory service
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Bind as `credentials` and return the requested attributes of that
    /// account. Either the whole normalized attribute set is returned or an
    /// error; partial results are never surfaced.
    async fn login(
        &self,
        credentials: &Credentials,
        requested: &[&str],
    ) -> Result<DirectoryAttributes, DirectoryError>;
}
