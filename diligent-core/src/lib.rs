//! Diligent Core - directory authentication and check configurations
//!
//! Authenticates users against the college directory, applies the group
//! policy, and defines the storage contracts the web layer builds on.

pub mod auth;
pub mod checks;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod storage;
pub mod traits;
pub mod types;

pub use auth::*;
pub use config::*;
pub use directory::{DirectoryAttributes, DirectoryClient, DirectoryError};
pub use error::*;
pub use logging::*;
pub use storage::MemoryStore;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
