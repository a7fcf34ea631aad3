//! Free-form SQL for administrators, the last-resort screen.

use serde::Serialize;

use crate::db::{Ack, Database, RowSet};
use crate::error::FleetError;

/// What came back from the console statement.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsoleOutcome {
    Rows(RowSet),
    Ack(Ack),
}

/// Statement heads that produce rows. Everything else runs as a mutation.
const QUERY_HEADS: [&str; 4] = ["select", "show", "describe", "explain"];

pub(crate) fn is_row_returning(sql: &str) -> bool {
    let head = sql.split_whitespace().next().unwrap_or("");
    QUERY_HEADS.iter().any(|h| head.eq_ignore_ascii_case(h))
}

/// Runs one statement exactly as typed. The text is the administrator's
/// own, so there are no parameters to bind; the admin session gate in
/// front of this handler is the only guard.
///
/// Mutations go over the text protocol: the server refuses to prepare
/// routine and trigger DDL, and the console must accept those too.
pub async fn run(db: &Database, sql: &str) -> Result<ConsoleOutcome, FleetError> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(FleetError::InvalidRequest("statement must not be empty".into()));
    }
    if is_row_returning(sql) {
        Ok(ConsoleOutcome::Rows(db.query(sql, Vec::new()).await?))
    } else {
        Ok(ConsoleOutcome::Ack(db.execute_raw(sql).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_returning_heads_are_recognized() {
        assert!(is_row_returning("SELECT * FROM BOOKINGS"));
        assert!(is_row_returning("  select 1"));
        assert!(is_row_returning("SHOW TABLES"));
        assert!(is_row_returning("describe CARS"));
        assert!(is_row_returning("EXPLAIN SELECT * FROM CARS"));
    }

    #[test]
    fn mutations_are_not() {
        assert!(!is_row_returning("DELETE FROM BOOKINGS WHERE booking_id = 9"));
        assert!(!is_row_returning("UPDATE CARS SET d_id = NULL"));
        assert!(!is_row_returning("INSERT INTO CLIENTS VALUES (1)"));
        assert!(!is_row_returning("selecting"));
        assert!(!is_row_returning(""));
    }

    #[test]
    fn routine_ddl_runs_as_a_mutation() {
        // Routine bodies cannot go through PREPARE; classifying them as
        // row-returning would send them down the prepared query path.
        assert!(!is_row_returning(
            "CREATE PROCEDURE CountCars() BEGIN SELECT COUNT(*) FROM CARS; END"
        ));
        assert!(!is_row_returning("CREATE TRIGGER t AFTER DELETE ON BOOKINGS FOR EACH ROW DELETE FROM REVENUE WHERE b_id = OLD.booking_id"));
        assert!(!is_row_returning("DROP TRIGGER IF EXISTS t"));
        assert!(!is_row_returning("DROP PROCEDURE CountCars"));
    }
}
