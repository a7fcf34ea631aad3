//! Fleet operations: typed wrappers over the DAL, one module per screen
//! of the dispatcher dashboard. Handlers pick an operation; everything
//! SQL-shaped stays down here.

pub mod bookings;
pub mod cars;
pub mod dashboard;
pub mod drivers;
pub mod grants;
pub mod sql_console;
pub mod tables;

use crate::db::RowSet;

/// The procedures used here produce at most one result set. Take it, and
/// tolerate a procedure that produced none.
pub(crate) fn first_result_set(mut sets: Vec<RowSet>) -> RowSet {
    if sets.is_empty() {
        RowSet::default()
    } else {
        sets.swap_remove(0)
    }
}
