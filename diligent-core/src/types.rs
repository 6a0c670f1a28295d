//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Login credentials as submitted by the end user.
///
/// The username is lower-cased and trimmed on construction. The password is
/// kept verbatim apart from surrounding whitespace and is redacted from
/// `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_lowercase(),
            password: password.trim().to_string(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Both fields carry something after normalization
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Persisted user record, keyed by username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub firstname: String,
    pub surname: String,
    pub is_student: bool,
}

/// Priority bucket a check is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];
}

/// A single selected check, e.g. `{"check": "config-2"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEntry {
    pub check: String,
}

impl CheckEntry {
    pub fn new(check: impl Into<String>) -> Self {
        Self {
            check: check.into(),
        }
    }
}

/// Check configuration before it has been stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConfiguration {
    pub title: String,
    pub creator: String,
    pub high: Vec<CheckEntry>,
    pub medium: Vec<CheckEntry>,
    pub low: Vec<CheckEntry>,
    pub course_code: Option<String>,
    pub exercise_num: Option<String>,
}

impl NewConfiguration {
    pub fn checks(&self, priority: Priority) -> &[CheckEntry] {
        match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }

    pub fn into_stored(self, id: String) -> Configuration {
        Configuration {
            id,
            title: self.title,
            creator: self.creator,
            high: self.high,
            medium: self.medium,
            low: self.low,
            course_code: self.course_code,
            exercise_num: self.exercise_num,
        }
    }
}

/// Stored check configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: String,
    pub title: String,
    pub creator: String,
    pub high: Vec<CheckEntry>,
    pub medium: Vec<CheckEntry>,
    pub low: Vec<CheckEntry>,
    pub course_code: Option<String>,
    pub exercise_num: Option<String>,
}

impl Configuration {
    pub fn checks(&self, priority: Priority) -> &[CheckEntry] {
        match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            course_code: self.course_code.clone(),
            exercise_num: self.exercise_num.clone(),
        }
    }
}

/// Listing view of a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub id: String,
    pub title: String,
    pub course_code: Option<String>,
    pub exercise_num: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_normalization() {
        let credentials = Credentials::new("  JDoe ", " s3cret\n");
        assert_eq!(credentials.username(), "jdoe");
        assert_eq!(credentials.password(), "s3cret");
        assert!(credentials.is_complete());

        assert!(!Credentials::new("   ", "pw").is_complete());
        assert!(!Credentials::new("jdoe", "  ").is_complete());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("jdoe", "hunter2");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("jdoe"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_configuration_priorities() {
        let config = NewConfiguration {
            title: "Lab 1".to_string(),
            creator: "jdoe".to_string(),
            high: vec![CheckEntry::new("config-2")],
            medium: vec![],
            low: vec![CheckEntry::new("config-15"), CheckEntry::new("config-16")],
            course_code: Some("40008".to_string()),
            exercise_num: None,
        }
        .into_stored("abc".to_string());

        assert_eq!(config.checks(Priority::High).len(), 1);
        assert!(config.checks(Priority::Medium).is_empty());
        assert_eq!(config.checks(Priority::Low)[1].check, "config-16");

        let summary = config.summary();
        assert_eq!(summary.id, "abc");
        assert_eq!(summary.course_code.as_deref(), Some("40008"));
    }
}
