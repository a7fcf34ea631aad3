//! Database access: connection pooling and the statement-shaped DAL.
//!
//! Layout:
//! - `provider.rs`: lazy MySQL pool, connection checkout, ping
//! - `dal.rs`: query / execute / call_procedure over the provider
//! - `value.rs`: dynamic parameter binding and row decoding
//! - `schema.rs`: DDL for the one table this program owns

pub mod dal;
pub mod provider;
pub mod schema;
pub mod value;

pub use dal::Ack;
pub use provider::Database;
pub use schema::APP_USERS_INIT;
pub use value::{RowSet, SqlParam};
