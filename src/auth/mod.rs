//! Operator authentication: password digests, the account store, and
//! session state.

pub mod password;
pub mod session;
pub mod store;

pub use session::{Role, Session};
pub use store::{Account, CredentialStore};
