pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod fleet;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use auth::{CredentialStore, Role, Session};
pub use db::Database;
pub use error::FleetError;
