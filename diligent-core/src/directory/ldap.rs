//! LDAP-backed directory client

use super::{normalize_attributes, DirectoryAttributes, DirectoryClient, DirectoryError};
use crate::config::DirectoryConfig;
use crate::types::Credentials;
use async_trait::async_trait;
use ldap3::{ldap_escape, Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use std::time::Duration;
use tracing::{debug, info, warn};

/// `invalidCredentials` result code
const RC_INVALID_CREDENTIALS: u32 = 49;
/// `noSuchObject` result code
const RC_NO_SUCH_OBJECT: u32 = 32;

/// Directory client opening a fresh connection for every login attempt.
///
/// Connections are never pooled or shared. Referrals returned by the server
/// are not followed.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    url: String,
    base_dn: String,
    bind_template: String,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

impl LdapDirectory {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            url: config.url.clone(),
            base_dn: config.base_dn.clone(),
            bind_template: config.bind_template.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        }
    }

    /// Principal name used for the simple bind, e.g. `jdoe@IC.AC.UK`
    pub fn bind_principal(&self, username: &str) -> String {
        self.bind_template.replace("{username}", username)
    }

    /// Search filter selecting the user object for `username`
    pub fn account_filter(username: &str) -> String {
        format!(
            "(&(objectClass=user)(sAMAccountName={}))",
            ldap_escape(username)
        )
    }

    async fn connect(&self) -> Result<Ldap, DirectoryError> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.connect_timeout);
        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.url)
            .await
            .map_err(|e| DirectoryError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection closed with error: {}", e);
            }
        });

        Ok(ldap)
    }

    async fn bind_and_search(
        &self,
        ldap: &mut Ldap,
        credentials: &Credentials,
        requested: &[&str],
    ) -> Result<DirectoryAttributes, DirectoryError> {
        let principal = self.bind_principal(credentials.username());

        ldap.with_timeout(self.operation_timeout)
            .simple_bind(&principal, credentials.password())
            .await
            .and_then(|result| result.success())
            .map_err(map_bind_error)?;

        debug!(username = credentials.username(), "Directory bind succeeded");

        let filter = Self::account_filter(credentials.username());
        let (entries, _) = ldap
            .with_timeout(self.operation_timeout)
            .search(&self.base_dn, Scope::Subtree, &filter, requested.to_vec())
            .await
            .and_then(|result| result.success())
            .map_err(map_search_error)?;

        let entry = entries
            .into_iter()
            .find(|entry| !entry.is_ref())
            .map(SearchEntry::construct)
            .ok_or(DirectoryError::NotFound)?;

        let raw = entry
            .attrs
            .into_iter()
            .map(|(name, values)| {
                let bytes: Vec<Vec<u8>> = values.into_iter().map(String::into_bytes).collect();
                (name, bytes)
            })
            .chain(entry.bin_attrs);

        Ok(normalize_attributes(raw))
    }
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    async fn login(
        &self,
        credentials: &Credentials,
        requested: &[&str],
    ) -> Result<DirectoryAttributes, DirectoryError> {
        let mut ldap = self.connect().await?;

        let outcome = self.bind_and_search(&mut ldap, credentials, requested).await;

        if let Err(e) = ldap.unbind().await {
            debug!("Directory unbind failed: {}", e);
        }

        match &outcome {
            Ok(attributes) => info!(
                username = credentials.username(),
                attributes = attributes.len(),
                "Directory login completed"
            ),
            Err(e) => debug!(username = credentials.username(), error = %e, "Directory login failed"),
        }

        outcome
    }
}

/// Only `invalidCredentials` is a rejected login; busy, unavailable and
/// similar result codes are server conditions.
fn map_bind_error(error: LdapError) -> DirectoryError {
    match error {
        LdapError::LdapResult { result } if result.rc == RC_INVALID_CREDENTIALS => {
            DirectoryError::InvalidCredentials
        }
        LdapError::LdapResult { result } => DirectoryError::Connection(format!(
            "bind failed with result code {}: {}",
            result.rc, result.text
        )),
        other => DirectoryError::Connection(other.to_string()),
    }
}

fn map_search_error(error: LdapError) -> DirectoryError {
    match error {
        LdapError::LdapResult { result } if result.rc == RC_NO_SUCH_OBJECT => {
            DirectoryError::NotFound
        }
        other => DirectoryError::Connection(other.to_string()),
    }
}
