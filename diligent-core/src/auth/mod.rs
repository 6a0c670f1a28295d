//! Authentication and authorization core

pub mod login;
pub mod policy;

pub use login::{is_student, user_from_attributes, LoginError, LoginOutcome, LoginService};
pub use policy::{AuthorizationPolicy, PolicyDecision};
