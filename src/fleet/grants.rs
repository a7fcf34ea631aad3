//! Database-account administration: CREATE USER, GRANT, REVOKE, DROP USER.
//!
//! None of these statements accept parameter markers in the positions that
//! matter (account names, hosts, privilege lists, the IDENTIFIED BY
//! literal), so every fragment is validated against a closed shape before
//! it is written into statement text. This is the only module allowed to
//! build such statements.

use serde::Deserialize;
use tracing::info;

use crate::config::CONFIG;
use crate::db::dal::{is_bare_identifier, quote_identifier};
use crate::db::Database;
use crate::error::FleetError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewDbAccount {
    pub username: String,
    #[serde(default = "default_host")]
    pub host: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantRequest {
    pub username: String,
    #[serde(default = "default_host")]
    pub host: String,
    /// Privilege names in lowercase request form, e.g. `["select", "execute"]`.
    pub privileges: Vec<String>,
    /// Table the grant applies to; None means every table in the database.
    pub table: Option<String>,
}

fn default_host() -> String {
    "localhost".into()
}

pub async fn create_db_account(db: &Database, req: &NewDbAccount) -> Result<(), FleetError> {
    validate_account(&req.username, &req.host)?;
    if !is_safe_password(&req.password) {
        return Err(FleetError::InvalidRequest(
            "database account password must be 1 to 128 characters and free of \
             quotes, backslashes, backticks and whitespace"
                .into(),
        ));
    }
    let account = account_ref(&req.username, &req.host);
    let statement = format!("CREATE USER {account} IDENTIFIED BY '{}'", req.password);
    let shown = format!("CREATE USER {account} IDENTIFIED BY '<redacted>'");
    db.execute_redacted(&statement, &shown).await?;
    info!(username = %req.username, host = %req.host, "database account created");
    Ok(())
}

pub async fn grant(db: &Database, req: &GrantRequest) -> Result<(), FleetError> {
    validate_account(&req.username, &req.host)?;
    let privileges = privilege_clause(&req.privileges)?;
    let target = grant_target(&CONFIG.database.database, req.table.as_deref())?;
    let statement = format!(
        "GRANT {privileges} ON {target} TO {}",
        account_ref(&req.username, &req.host)
    );
    db.execute(&statement, Vec::new()).await?;
    info!(
        username = %req.username,
        host = %req.host,
        privileges = %privileges,
        target = %target,
        "privileges granted"
    );
    Ok(())
}

pub async fn revoke(db: &Database, req: &GrantRequest) -> Result<(), FleetError> {
    validate_account(&req.username, &req.host)?;
    let privileges = privilege_clause(&req.privileges)?;
    let target = grant_target(&CONFIG.database.database, req.table.as_deref())?;
    let statement = format!(
        "REVOKE {privileges} ON {target} FROM {}",
        account_ref(&req.username, &req.host)
    );
    db.execute(&statement, Vec::new()).await?;
    info!(
        username = %req.username,
        host = %req.host,
        privileges = %privileges,
        target = %target,
        "privileges revoked"
    );
    Ok(())
}

pub async fn drop_db_account(db: &Database, username: &str, host: &str) -> Result<(), FleetError> {
    validate_account(username, host)?;
    let statement = format!("DROP USER {}", account_ref(username, host));
    db.execute(&statement, Vec::new()).await?;
    info!(username, host, "database account dropped");
    Ok(())
}

fn validate_account(username: &str, host: &str) -> Result<(), FleetError> {
    if !is_bare_identifier(username) {
        return Err(FleetError::InvalidIdentifier(format!(
            "'{username}' is not a valid account name"
        )));
    }
    if !is_valid_host(host) {
        return Err(FleetError::InvalidIdentifier(format!(
            "'{host}' is not a valid account host"
        )));
    }
    Ok(())
}

/// `'name'@'host'`, both parts already validated against shapes that
/// cannot contain a quote.
fn account_ref(username: &str, host: &str) -> String {
    format!("'{username}'@'{host}'")
}

/// `%`, `localhost`, or a dotted name/address built from the obvious
/// characters.
pub(crate) fn is_valid_host(host: &str) -> bool {
    host == "%"
        || (!host.is_empty()
            && host.len() <= 255
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
}

/// IDENTIFIED BY takes a quoted literal and nothing else, so the password
/// is restricted to characters that cannot terminate the literal.
pub(crate) fn is_safe_password(password: &str) -> bool {
    !password.is_empty()
        && password.len() <= 128
        && password
            .chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '\'' | '"' | '\\' | '`'))
}

/// Builds the privilege list from the fixed vocabulary. `all` swallows the
/// rest; duplicates collapse; anything unknown is refused.
fn privilege_clause(requested: &[String]) -> Result<String, FleetError> {
    if requested.is_empty() {
        return Err(FleetError::InvalidRequest(
            "at least one privilege is required".into(),
        ));
    }
    let mut parts: Vec<&'static str> = Vec::new();
    for privilege in requested {
        let keyword = match privilege.to_ascii_lowercase().as_str() {
            "all" => return Ok("ALL PRIVILEGES".into()),
            "select" => "SELECT",
            "insert" => "INSERT",
            "update" => "UPDATE",
            "delete" => "DELETE",
            "execute" => "EXECUTE",
            other => {
                return Err(FleetError::InvalidRequest(format!(
                    "unsupported privilege '{other}'"
                )));
            }
        };
        if !parts.contains(&keyword) {
            parts.push(keyword);
        }
    }
    Ok(parts.join(", "))
}

/// `db.*` or `db.table`, everything backtick-quoted after validation.
fn grant_target(database: &str, table: Option<&str>) -> Result<String, FleetError> {
    if !is_bare_identifier(database) {
        return Err(FleetError::InvalidIdentifier(format!(
            "'{database}' is not a usable database name"
        )));
    }
    match table {
        None => Ok(format!("{}.*", quote_identifier(database))),
        Some(t) if is_bare_identifier(t) => Ok(format!(
            "{}.{}",
            quote_identifier(database),
            quote_identifier(t)
        )),
        Some(t) => Err(FleetError::InvalidIdentifier(format!(
            "'{t}' is not a valid table name"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosts_follow_the_allow_list() {
        assert!(is_valid_host("%"));
        assert!(is_valid_host("localhost"));
        assert!(is_valid_host("10.0.0.7"));
        assert!(is_valid_host("db-replica_2.internal"));
        assert!(!is_valid_host(""));
        assert!(!is_valid_host("evil'host"));
        assert!(!is_valid_host("host with spaces"));
        assert!(!is_valid_host("h%st"));
    }

    #[test]
    fn passwords_cannot_escape_the_literal() {
        assert!(is_safe_password("S3cure!pass"));
        assert!(is_safe_password("a"));
        assert!(!is_safe_password(""));
        assert!(!is_safe_password("pa'ss"));
        assert!(!is_safe_password("pa\"ss"));
        assert!(!is_safe_password("pa\\ss"));
        assert!(!is_safe_password("pa`ss"));
        assert!(!is_safe_password("pa ss"));
        assert!(!is_safe_password(&"x".repeat(129)));
    }

    #[test]
    fn privilege_lists_come_from_the_fixed_vocabulary() {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            privilege_clause(&list(&["select", "EXECUTE", "select"])).unwrap(),
            "SELECT, EXECUTE"
        );
        assert_eq!(
            privilege_clause(&list(&["insert", "all", "drop"])).unwrap(),
            "ALL PRIVILEGES"
        );
        assert!(matches!(
            privilege_clause(&list(&["drop"])),
            Err(FleetError::InvalidRequest(_))
        ));
        assert!(matches!(
            privilege_clause(&[]),
            Err(FleetError::InvalidRequest(_))
        ));
    }

    #[test]
    fn grant_targets_are_quoted_and_validated() {
        assert_eq!(grant_target("fleetdesk", None).unwrap(), "`fleetdesk`.*");
        assert_eq!(
            grant_target("fleetdesk", Some("BOOKINGS")).unwrap(),
            "`fleetdesk`.`BOOKINGS`"
        );
        assert!(matches!(
            grant_target("fleetdesk", Some("BOOKINGS; DROP")),
            Err(FleetError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            grant_target("bad db", None),
            Err(FleetError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn hostile_account_names_never_reach_statement_text() {
        assert!(matches!(
            validate_account("reporting'; DROP USER x; --", "%"),
            Err(FleetError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            validate_account("reporting", "bad'host"),
            Err(FleetError::InvalidIdentifier(_))
        ));
        assert!(validate_account("reporting", "%").is_ok());
    }
}
