//! # Middleware

pub mod admin_guard;

pub use admin_guard::{AdminGuardState, require_admin};
