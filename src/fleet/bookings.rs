//! Booking lifecycle: capture, listing, deletion, time corrections.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::{Ack, Database, RowSet, SqlParam};
use crate::error::FleetError;

/// Form payload for the AddBooking procedure, fields in procedure
/// parameter order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub op_id: u32,
    pub d_id: u32,
    pub client_id: u32,
    pub booking_type: String,
    pub time_of_booking: NaiveDateTime,
    pub time_of_pickup: NaiveDateTime,
    pub pickup_location: String,
    pub destination: String,
    pub payment_type: String,
    pub price: Decimal,
}

/// Books a trip through the AddBooking procedure. Row creation, revenue
/// bookkeeping and any price rules live in the procedure body, not here.
pub async fn add(db: &Database, booking: NewBooking) -> Result<(), FleetError> {
    db.call_procedure(
        "AddBooking",
        vec![
            SqlParam::from(booking.op_id),
            SqlParam::from(booking.d_id),
            SqlParam::from(booking.client_id),
            SqlParam::from(booking.booking_type),
            SqlParam::from(booking.time_of_booking),
            SqlParam::from(booking.time_of_pickup),
            SqlParam::from(booking.pickup_location),
            SqlParam::from(booking.destination),
            SqlParam::from(booking.payment_type),
            SqlParam::from(booking.price),
        ],
    )
    .await?;
    Ok(())
}

/// The newest bookings, newest first.
pub async fn recent(db: &Database, limit: u32) -> Result<RowSet, FleetError> {
    db.query(
        "SELECT * FROM BOOKINGS ORDER BY time_of_booking DESC LIMIT ?",
        vec![SqlParam::from(limit)],
    )
    .await
}

/// Compact listing for pickers: id and route only.
pub async fn selector_list(db: &Database) -> Result<RowSet, FleetError> {
    db.query(
        "SELECT booking_id, pickup_location, destination FROM BOOKINGS ORDER BY booking_id DESC",
        Vec::new(),
    )
    .await
}

/// Deletes one booking. The log_deleted_booking trigger records the
/// deletion on the engine side; nothing here needs to.
pub async fn delete(db: &Database, booking_id: u64) -> Result<bool, FleetError> {
    let ack = db
        .execute(
            "DELETE FROM BOOKINGS WHERE booking_id = ?",
            vec![SqlParam::from(booking_id)],
        )
        .await?;
    Ok(ack.rows_affected > 0)
}

/// Corrects the two timestamps on an existing booking. `rows_affected`
/// counts changed rows, not matched ones, so a no-op correction reports 0.
pub async fn update_times(
    db: &Database,
    booking_id: u64,
    time_of_booking: NaiveDateTime,
    time_of_pickup: NaiveDateTime,
) -> Result<Ack, FleetError> {
    db.execute(
        "UPDATE BOOKINGS SET time_of_booking = ?, time_of_pickup = ? WHERE booking_id = ?",
        vec![
            SqlParam::from(time_of_booking),
            SqlParam::from(time_of_pickup),
            SqlParam::from(booking_id),
        ],
    )
    .await
}
