//! HTTP request handlers for the Diligent web server
//!
//! Authentication handlers live in [`crate::auth::handlers`].

pub mod configuration;
pub mod health;
pub mod plugin;
pub mod types;

pub use configuration::*;
pub use health::*;
pub use plugin::*;

// Re-export all types for convenience
pub use types::*;
