//! Fixture-backed directory for development and tests
//!
//! Entries are stored in directory wire form and go through the same
//! normalization as live search results:
//!
//! ```json
//! {
//!   "jdoe": {
//!     "password": "secret",
//!     "attributes": {
//!       "givenName": ["John"],
//!       "distinguishedName": ["CN=jdoe,OU=doc,OU=Users,DC=ic,DC=ac,DC=uk"]
//!     }
//!   }
//! }
//! ```

use super::{normalize_attributes, DirectoryAttributes, DirectoryClient, DirectoryError};
use crate::error::{DiligentError, DiligentResult, ErrorContext};
use crate::types::Credentials;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// One account known to the fixture directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureEntry {
    /// Required password; any non-empty password binds when absent
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl FixtureEntry {
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_attribute(mut self, name: &str, values: &[&str]) -> Self {
        self.attributes.insert(
            name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixtureDirectory {
    entries: HashMap<String, FixtureEntry>,
}

impl FixtureDirectory {
    /// Usernames are lower-cased to match normalized credentials
    pub fn new(entries: HashMap<String, FixtureEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(username, entry)| (username.to_lowercase(), entry))
                .collect(),
        }
    }

    /// Load fixture entries from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DiligentResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DiligentError::Config {
            message: format!("Failed to read directory fixture: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("fixture_directory")
                .with_operation("read_file")
                .with_metadata("path", &path.display().to_string()),
        })?;

        let entries: HashMap<String, FixtureEntry> =
            serde_json::from_str(&content).map_err(|e| DiligentError::Config {
                message: format!("Failed to parse directory fixture: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("fixture_directory")
                    .with_operation("parse_json")
                    .with_suggestion("The fixture must map usernames to {password, attributes}"),
            })?;

        info!(
            "Loaded {} fixture directory entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::new(entries))
    }

    pub fn insert(&mut self, username: &str, entry: FixtureEntry) {
        self.entries.insert(username.to_lowercase(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DirectoryClient for FixtureDirectory {
    async fn login(
        &self,
        credentials: &Credentials,
        requested: &[&str],
    ) -> Result<DirectoryAttributes, DirectoryError> {
        let entry = self
            .entries
            .get(credentials.username())
            .ok_or(DirectoryError::InvalidCredentials)?;

        if credentials.password().is_empty()
            || entry
                .password
                .as_deref()
                .is_some_and(|expected| expected != credentials.password())
        {
            return Err(DirectoryError::InvalidCredentials);
        }

        debug!(username = credentials.username(), "Fixture directory bind");

        let raw = entry
            .attributes
            .iter()
            .filter(|(name, _)| requested.contains(&name.as_str()))
            .map(|(name, values)| (name.clone(), values.iter().map(String::as_bytes)));

        Ok(normalize_attributes(raw))
    }
}
