//! Car roster and driver assignment.

use crate::db::{Ack, Database, RowSet, SqlParam};
use crate::error::FleetError;

pub async fn list(db: &Database) -> Result<RowSet, FleetError> {
    db.query(
        "SELECT registration, car_make, car_model, d_id, status FROM CARS",
        Vec::new(),
    )
    .await
}

/// Points a car at a driver, or at no driver at all. The update_car_status
/// trigger flips the status column on the engine side. `rows_affected`
/// counts changed rows, so re-assigning the same driver reports 0.
pub async fn assign(
    db: &Database,
    registration: &str,
    driver_id: Option<u32>,
) -> Result<Ack, FleetError> {
    db.execute(
        "UPDATE CARS SET d_id = ? WHERE registration = ?",
        vec![SqlParam::from(driver_id), SqlParam::from(registration)],
    )
    .await
}

/// Cars currently without a driver, straight from the GetAvailableCars
/// procedure.
pub async fn available(db: &Database) -> Result<RowSet, FleetError> {
    let sets = db.call_procedure("GetAvailableCars", Vec::new()).await?;
    Ok(super::first_result_set(sets))
}
