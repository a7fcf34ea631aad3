//! Data-access layer: the only place SQL leaves the process.
//!
//! Three shapes cover everything the application does:
//! - [`Database::query`] for row-returning statements
//! - [`Database::execute`] for mutations
//! - [`Database::call_procedure`] for stored procedures, which may hand
//!   back any number of result sets
//!
//! Parameters always travel as bound placeholders; the statement text is
//! prepared verbatim and never has values spliced in. Engine errors come
//! back with their original message so operators see what MySQL said.

use futures::TryStreamExt;
use serde::Serialize;
use sqlx::{Either, Executor};
use tracing::debug;

use crate::db::provider::Database;
use crate::db::value::{RowSet, SqlParam, bind_params};
use crate::error::FleetError;

/// Outcome of a mutation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Ack {
    pub rows_affected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_insert_id: Option<u64>,
}

#[derive(Clone, Copy)]
enum Op {
    Query,
    Execute,
    Procedure,
}

impl Database {
    /// Runs a row-returning statement and decodes every row.
    pub async fn query(
        &self,
        statement: &str,
        params: Vec<SqlParam>,
    ) -> Result<RowSet, FleetError> {
        debug!(statement, params = params.len(), "query");
        let mut conn = self.acquire().await?;
        let rows = bind_params(sqlx::query(statement), params)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| op_error(Op::Query, e))?;
        RowSet::from_rows(&rows).map_err(|e| op_error(Op::Query, e))
    }

    /// Runs a mutating statement and reports how many rows it touched.
    pub async fn execute(
        &self,
        statement: &str,
        params: Vec<SqlParam>,
    ) -> Result<Ack, FleetError> {
        self.execute_inner(statement, statement, params).await
    }

    /// Like [`Database::execute`], but logs `shown` in place of the
    /// statement text. For the handful of account statements that must
    /// embed a secret literal because their grammar takes no placeholders.
    pub async fn execute_redacted(
        &self,
        statement: &str,
        shown: &str,
    ) -> Result<Ack, FleetError> {
        self.execute_inner(statement, shown, Vec::new()).await
    }

    async fn execute_inner(
        &self,
        statement: &str,
        shown: &str,
        params: Vec<SqlParam>,
    ) -> Result<Ack, FleetError> {
        debug!(statement = shown, params = params.len(), "execute");
        let mut conn = self.acquire().await?;
        let done = bind_params(sqlx::query(statement), params)
            .execute(&mut *conn)
            .await
            .map_err(|e| op_error(Op::Execute, e))?;
        let last_insert_id = done.last_insert_id();
        Ok(Ack {
            rows_affected: done.rows_affected(),
            last_insert_id: (last_insert_id != 0).then_some(last_insert_id),
        })
    }

    /// Runs a statement over the text protocol instead of preparing it.
    /// Routine and trigger DDL cannot go through PREPARE, so the console's
    /// mutation path lands here. Takes no parameters by construction.
    pub async fn execute_raw(&self, statement: &str) -> Result<Ack, FleetError> {
        debug!(statement, "execute raw");
        let mut conn = self.acquire().await?;
        // Driven through `Executor::execute` rather than the equivalent
        // `RawSql::execute` wrapper: the wrapper's generic future breaks
        // axum `Handler` inference for handlers that await this call.
        let done = (&mut *conn)
            .execute(sqlx::raw_sql(statement))
            .await
            .map_err(|e| op_error(Op::Execute, e))?;
        let last_insert_id = done.last_insert_id();
        Ok(Ack {
            rows_affected: done.rows_affected(),
            last_insert_id: (last_insert_id != 0).then_some(last_insert_id),
        })
    }

    /// Invokes a stored procedure and collects every result set it emits,
    /// in order. Procedures that only mutate yield an empty list.
    ///
    /// The name must be a bare identifier; it is the one fragment of the
    /// statement that cannot be a placeholder, so it is validated before
    /// being quoted into the CALL.
    pub async fn call_procedure(
        &self,
        name: &str,
        params: Vec<SqlParam>,
    ) -> Result<Vec<RowSet>, FleetError> {
        let call = build_call(name, params.len())?;
        debug!(procedure = name, params = params.len(), "call procedure");
        let mut conn = self.acquire().await?;
        let mut stream = (&mut *conn).fetch_many(bind_params(sqlx::query(&call), params));

        let mut sets = Vec::new();
        let mut pending = Vec::new();
        while let Some(step) = stream
            .try_next()
            .await
            .map_err(|e| op_error(Op::Procedure, e))?
        {
            match step {
                // Each Left marks the end of one result set.
                Either::Left(_) => {
                    let set = RowSet::from_rows(&pending)
                        .map_err(|e| op_error(Op::Procedure, e))?;
                    pending.clear();
                    sets.push(set);
                }
                Either::Right(row) => pending.push(row),
            }
        }
        if !pending.is_empty() {
            let set =
                RowSet::from_rows(&pending).map_err(|e| op_error(Op::Procedure, e))?;
            sets.push(set);
        }
        discard_call_status(&mut sets);
        Ok(sets)
    }
}

/// The CALL itself is acknowledged with a final OK after the last SELECT,
/// which surfaces here as one empty trailing set. Drop exactly that one.
fn discard_call_status(sets: &mut Vec<RowSet>) {
    if sets
        .last()
        .is_some_and(|s| s.columns.is_empty() && s.rows.is_empty())
    {
        sets.pop();
    }
}

fn build_call(name: &str, arity: usize) -> Result<String, FleetError> {
    if !is_bare_identifier(name) {
        return Err(FleetError::InvalidIdentifier(format!(
            "'{name}' is not a valid procedure name"
        )));
    }
    let placeholders = vec!["?"; arity].join(", ");
    Ok(format!("CALL {}({placeholders})", quote_identifier(name)))
}

/// Accepts exactly the unquoted-identifier shape: starts with an ASCII
/// letter or underscore, continues with letters, digits and underscores,
/// at most 64 characters. Anything else must not reach statement text.
pub(crate) fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= 64
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Backtick-quotes an identifier, doubling any embedded backtick per the
/// MySQL quoting rule. Names that passed [`is_bare_identifier`] cannot
/// contain one; server-reported table names get the doubling.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Transport failures map to [`FleetError::Connection`] no matter which
/// operation tripped them; everything the engine itself reported keeps its
/// message under the operation's own error.
fn op_error(op: Op, err: sqlx::Error) -> FleetError {
    if matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
    ) {
        return FleetError::Connection(err.to_string());
    }
    let message = match err {
        sqlx::Error::Database(db) => db.message().to_owned(),
        other => other.to_string(),
    };
    match op {
        Op::Query => FleetError::Query(message),
        Op::Execute => FleetError::Execution(message),
        Op::Procedure => FleetError::Procedure(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifier_shape_is_enforced() {
        assert!(is_bare_identifier("GetDriverBookings"));
        assert!(is_bare_identifier("add_booking_2"));
        assert!(is_bare_identifier("_scratch"));
        assert!(!is_bare_identifier(""));
        assert!(!is_bare_identifier("2fast"));
        assert!(!is_bare_identifier("drop table"));
        assert!(!is_bare_identifier("x;--"));
        assert!(!is_bare_identifier("BOOKINGS`; DROP TABLE CARS"));
        assert!(!is_bare_identifier("naïve"));
        assert!(!is_bare_identifier(&"x".repeat(65)));
    }

    #[test]
    fn call_text_has_one_placeholder_per_param() {
        assert_eq!(
            build_call("AddBooking", 10).unwrap(),
            "CALL `AddBooking`(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        assert_eq!(build_call("GetAvailableCars", 0).unwrap(), "CALL `GetAvailableCars`()");
    }

    #[test]
    fn call_rejects_hostile_names() {
        let err = build_call("x(); DROP TABLE BOOKINGS", 0).unwrap_err();
        assert!(matches!(err, FleetError::InvalidIdentifier(_)));
    }

    #[test]
    fn quoting_doubles_embedded_backticks() {
        assert_eq!(quote_identifier("BOOKINGS"), "`BOOKINGS`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn only_the_trailing_status_set_is_dropped() {
        let data = RowSet {
            columns: vec!["booking_id".into()],
            rows: vec![vec![json!(1)]],
        };

        let mut sets = vec![RowSet::default()];
        discard_call_status(&mut sets);
        assert!(sets.is_empty());

        let mut sets = vec![data.clone(), RowSet::default()];
        discard_call_status(&mut sets);
        assert_eq!(sets, vec![data.clone()]);

        // An empty set in the middle of the sequence is real output.
        let mut sets = vec![RowSet::default(), RowSet::default()];
        discard_call_status(&mut sets);
        assert_eq!(sets.len(), 1);

        let mut sets = vec![data.clone()];
        discard_call_status(&mut sets);
        assert_eq!(sets, vec![data]);
    }

    #[tokio::test]
    async fn redacted_execution_maps_transport_failures() {
        let db = Database::connect(&crate::config::DatabaseConfig {
            host: "127.0.0.1".into(),
            port: 1,
            username: "fleetdesk".into(),
            password: String::new(),
            database: "fleetdesk".into(),
            max_connections: 1,
            acquire_timeout_secs: 2,
        });
        let err = db
            .execute_redacted(
                "CREATE USER 'rpt'@'localhost' IDENTIFIED BY 'hunter2'",
                "CREATE USER 'rpt'@'localhost' IDENTIFIED BY '<redacted>'",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::Connection(_)), "{err}");
    }

    #[test]
    fn transport_failures_map_to_connection() {
        assert!(matches!(
            op_error(Op::Query, sqlx::Error::PoolTimedOut),
            FleetError::Connection(_)
        ));
        assert!(matches!(
            op_error(Op::Execute, sqlx::Error::Protocol("bad frame".into())),
            FleetError::Connection(_)
        ));
        assert!(matches!(
            op_error(Op::Query, sqlx::Error::RowNotFound),
            FleetError::Query(_)
        ));
        assert!(matches!(
            op_error(Op::Procedure, sqlx::Error::RowNotFound),
            FleetError::Procedure(_)
        ));
    }
}
