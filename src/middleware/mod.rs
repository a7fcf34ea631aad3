//! Request-level gates that run before handler bodies.

pub mod auth;

pub use auth::{AdminUser, CurrentUser};
