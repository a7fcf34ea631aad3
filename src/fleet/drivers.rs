//! Driver onboarding and per-driver lookups.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::db::{Database, RowSet, SqlParam};
use crate::error::FleetError;

/// Form payload for the AddDriver procedure, fields in procedure
/// parameter order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDriver {
    pub d_id: u32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub gender: String,
    pub phone: String,
    pub dob: NaiveDate,
    pub date_employed: NaiveDate,
    pub aadhaar: String,
}

pub async fn add(db: &Database, driver: NewDriver) -> Result<(), FleetError> {
    db.call_procedure(
        "AddDriver",
        vec![
            SqlParam::from(driver.d_id),
            SqlParam::from(driver.first_name),
            SqlParam::from(driver.last_name),
            SqlParam::from(driver.address),
            SqlParam::from(driver.gender),
            SqlParam::from(driver.phone),
            SqlParam::from(driver.dob),
            SqlParam::from(driver.date_employed),
            SqlParam::from(driver.aadhaar),
        ],
    )
    .await?;
    Ok(())
}

pub async fn bookings(db: &Database, d_id: u32) -> Result<RowSet, FleetError> {
    run_driver_procedure(db, "GetDriverBookings", d_id).await
}

pub async fn revenue(db: &Database, d_id: u32) -> Result<RowSet, FleetError> {
    run_driver_procedure(db, "GetDriverRevenue", d_id).await
}

pub async fn shift(db: &Database, d_id: u32) -> Result<RowSet, FleetError> {
    run_driver_procedure(db, "GetDriverShift", d_id).await
}

/// Lifetime earnings of one driver via the GetDriverTotalRevenue SQL
/// function. Whatever the function returns passes through as JSON,
/// including NULL.
pub async fn total_revenue(db: &Database, d_id: u32) -> Result<JsonValue, FleetError> {
    let set = db
        .query(
            "SELECT GetDriverTotalRevenue(?) AS total_revenue",
            vec![SqlParam::from(d_id)],
        )
        .await?;
    Ok(set.single_value().cloned().unwrap_or(JsonValue::Null))
}

async fn run_driver_procedure(
    db: &Database,
    name: &str,
    d_id: u32,
) -> Result<RowSet, FleetError> {
    let sets = db.call_procedure(name, vec![SqlParam::from(d_id)]).await?;
    Ok(super::first_result_set(sets))
}
