//! Ad-hoc table browsing, the "view tables" screen.

use crate::db::dal::quote_identifier;
use crate::db::{Database, RowSet};
use crate::error::FleetError;

/// Table names as the server reports them, in `SHOW TABLES` order.
pub async fn list_tables(db: &Database) -> Result<Vec<String>, FleetError> {
    let set = db.query("SHOW TABLES", Vec::new()).await?;
    Ok(set
        .rows
        .iter()
        .filter_map(|row| row.first().and_then(|v| v.as_str()).map(str::to_owned))
        .collect())
}

/// `SELECT *` over one named table. A table name cannot be a bound
/// parameter, so the requested name must match the live `SHOW TABLES`
/// list exactly; the copy written into the statement is the server's own,
/// never the caller's bytes.
pub async fn browse(db: &Database, table: &str) -> Result<RowSet, FleetError> {
    let known = list_tables(db).await?;
    let Some(name) = resolve_table(&known, table) else {
        return Err(FleetError::NotFound(format!("table '{table}' does not exist")));
    };
    let statement = format!("SELECT * FROM {}", quote_identifier(name));
    db.query(&statement, Vec::new()).await
}

fn resolve_table<'a>(known: &'a [String], requested: &str) -> Option<&'a str> {
    known
        .iter()
        .find(|t| t.as_str() == requested)
        .map(String::as_str)
}
