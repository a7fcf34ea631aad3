//! HTTP handlers, grouped the way the dashboard menus group their screens.
//!
//! Handlers stay SQL-free: they pick a core operation, pass typed values
//! through, and let [`crate::error::FleetError`] shape every failure.

pub mod admin;
pub mod auth;
pub mod fleet;
