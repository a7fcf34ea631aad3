//! Operator account store: verification, provisioning, bootstrap.
//!
//! Every statement here goes through the DAL with bound parameters; the
//! store never holds a connection of its own. Stored digests never leave
//! this module.

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::Role;
use crate::db::schema::APP_USERS_INIT;
use crate::db::value::RowSet;
use crate::db::{Database, SqlParam};
use crate::error::FleetError;

/// Username seeded on first run.
pub const BOOTSTRAP_USERNAME: &str = "admin";
/// Default password for the seeded account, expected to be rotated.
pub const BOOTSTRAP_PASSWORD: &str = "admin123";

/// Projection handed out after a successful credential check.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates APP_USERS if missing and re-seeds the bootstrap admin
    /// whenever no `admin` row exists. Runs on every startup, so deleting
    /// the account only lasts until the next restart.
    pub async fn bootstrap(&self) -> Result<(), FleetError> {
        self.db.execute(APP_USERS_INIT, Vec::new()).await?;
        let admin = self
            .db
            .query(
                "SELECT password FROM APP_USERS WHERE username = ?",
                vec![SqlParam::from(BOOTSTRAP_USERNAME)],
            )
            .await?;
        match admin.single_value() {
            None => {
                self.db
                    .execute(
                        "INSERT INTO APP_USERS (username, password, role) VALUES (?, ?, ?)",
                        vec![
                            SqlParam::from(BOOTSTRAP_USERNAME),
                            SqlParam::from(hash_password(BOOTSTRAP_PASSWORD)),
                            SqlParam::from(Role::Admin.as_str()),
                        ],
                    )
                    .await?;
                info!(username = BOOTSTRAP_USERNAME, "seeded bootstrap administrator");
                warn!("bootstrap administrator uses the default password; change it after first sign-in");
            }
            Some(digest) => {
                if digest.as_str() == Some(hash_password(BOOTSTRAP_PASSWORD).as_str()) {
                    warn!("bootstrap administrator still uses the default password");
                }
            }
        }
        Ok(())
    }

    /// Checks a username/password pair. Unknown username and wrong
    /// password fail identically; callers learn nothing about which.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Account, FleetError> {
        let rows = self
            .db
            .query(
                "SELECT user_id, username, password, role FROM APP_USERS WHERE username = ?",
                vec![SqlParam::from(username)],
            )
            .await?;
        if rows.is_empty() {
            return Err(FleetError::AuthenticationFailed);
        }
        let digest = rows
            .value(0, "password")
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed("password"))?;
        if !verify_password(password, digest) {
            return Err(FleetError::AuthenticationFailed);
        }
        parse_account(&rows, 0)
    }

    /// Provisions an operator account, returning its id. The UNIQUE index
    /// on `username` is the sole duplicate check.
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<u64, FleetError> {
        if username.is_empty() || username.len() > 64 {
            return Err(FleetError::InvalidRequest(
                "username must be 1 to 64 characters".into(),
            ));
        }
        if password.is_empty() {
            return Err(FleetError::InvalidRequest("password must not be empty".into()));
        }
        let ack = self
            .db
            .execute(
                "INSERT INTO APP_USERS (username, password, role) VALUES (?, ?, ?)",
                vec![
                    SqlParam::from(username),
                    SqlParam::from(hash_password(password)),
                    SqlParam::from(role.as_str()),
                ],
            )
            .await
            .map_err(|e| match e {
                FleetError::Execution(msg) if is_duplicate(&msg) => {
                    FleetError::DuplicateUsername(username.to_owned())
                }
                other => other,
            })?;
        info!(username, role = %role, "operator account created");
        Ok(ack.last_insert_id.unwrap_or_default())
    }

    /// Removes an account by id. Ok(false) when no row matched.
    pub async fn delete_account(&self, user_id: u64) -> Result<bool, FleetError> {
        let ack = self
            .db
            .execute(
                "DELETE FROM APP_USERS WHERE user_id = ?",
                vec![SqlParam::from(user_id)],
            )
            .await?;
        if ack.rows_affected > 0 {
            info!(user_id, "operator account deleted");
        }
        Ok(ack.rows_affected > 0)
    }

    /// All accounts in id order, digests excluded.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, FleetError> {
        let rows = self
            .db
            .query(
                "SELECT user_id, username, role FROM APP_USERS ORDER BY user_id",
                Vec::new(),
            )
            .await?;
        (0..rows.len()).map(|i| parse_account(&rows, i)).collect()
    }
}

/// ER_DUP_ENTRY surfaces as "Duplicate entry '...' for key ...".
fn is_duplicate(message: &str) -> bool {
    message.contains("Duplicate entry")
}

fn parse_account(rows: &RowSet, row: usize) -> Result<Account, FleetError> {
    let user_id = rows
        .value(row, "user_id")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| malformed("user_id"))?;
    let username = rows
        .value(row, "username")
        .and_then(|v| v.as_str())
        .ok_or_else(|| malformed("username"))?
        .to_owned();
    let role = rows
        .value(row, "role")
        .and_then(|v| v.as_str())
        .ok_or_else(|| malformed("role"))?
        .parse::<Role>()?;
    Ok(Account {
        user_id,
        username,
        role,
    })
}

fn malformed(column: &str) -> FleetError {
    FleetError::Query(format!("APP_USERS row is missing '{column}'"))
}
