//! Core error type
//!
//! Every constructed error carries an [`ErrorContext`] with a tracking id, so a
//! 500 returned to a client can be matched with the server log line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

pub type DiligentResult<T> = Result<T, DiligentError>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Errors raised by the core and the stores behind it
#[derive(Error, Debug)]
pub enum DiligentError {
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DiligentError {
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            DiligentError::Storage { context, .. } | DiligentError::Config { context, .. } => {
                Some(context)
            }
            DiligentError::Io(_) | DiligentError::Serialization(_) => None,
        }
    }

    /// Storage failure without an underlying source error
    pub fn storage(message: impl Into<String>, component: &str) -> Self {
        DiligentError::Storage {
            message: message.into(),
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Log the error with its tracking id
    pub fn log(&self) {
        let context = self.context();
        match self {
            DiligentError::Config { .. } => {
                error!(
                    error_id = ?context.map(|c| &c.error_id),
                    suggestions = ?context.map(|c| &c.recovery_suggestions),
                    error = %self,
                    "Configuration error"
                );
            }
            _ => {
                error!(
                    error_id = ?context.map(|c| &c.error_id),
                    component = ?context.map(|c| &c.component),
                    operation = ?context.and_then(|c| c.operation.as_deref()),
                    error = %self,
                    "Storage failure"
                );
            }
        }
    }
}
