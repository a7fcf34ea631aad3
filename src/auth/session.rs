//! Session state for signed-in operators.
//!
//! A [`Session`] lives only inside the private cookie minted at sign-in.
//! The cookie key is generated per process, so every session dies with the
//! process; nothing here is ever persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FleetError;

/// Access level of an operator account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(FleetError::Query(format!("unrecognized role '{other}'"))),
        }
    }
}

/// Everything the rest of the program knows about a signed-in operator.
/// No password material, only the verified account projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Whether this session clears the given access bar. Admins clear
    /// both bars; users only their own.
    pub fn permits(&self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => self.role == Role::Admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            user_id: 3,
            username: "dispatch".into(),
            role,
            started_at: Utc::now(),
        }
    }

    #[test]
    fn admin_clears_both_bars() {
        assert!(session(Role::Admin).permits(Role::User));
        assert!(session(Role::Admin).permits(Role::Admin));
        assert!(session(Role::User).permits(Role::User));
        assert!(!session(Role::User).permits(Role::Admin));
    }

    #[test]
    fn roles_parse_from_their_column_form() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let round: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(round, Role::User);
    }
}
