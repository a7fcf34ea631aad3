//! Dashboard, table browsing, bookings, cars and drivers. All behind the
//! signed-in gate; none require the admin bar.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use crate::db::{Ack, RowSet};
use crate::error::FleetError;
use crate::fleet::bookings::NewBooking;
use crate::fleet::dashboard::Overview;
use crate::fleet::drivers::NewDriver;
use crate::fleet::{bookings, cars, dashboard, drivers, tables};
use crate::middleware::auth::CurrentUser;
use crate::router::FleetState;

pub async fn overview(
    _user: CurrentUser,
    State(state): State<FleetState>,
) -> Result<Json<Overview>, FleetError> {
    Ok(Json(dashboard::overview(&state.db).await?))
}

pub async fn list_tables(
    _user: CurrentUser,
    State(state): State<FleetState>,
) -> Result<Json<Vec<String>>, FleetError> {
    Ok(Json(tables::list_tables(&state.db).await?))
}

pub async fn browse_table(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Path(table): Path<String>,
) -> Result<Json<RowSet>, FleetError> {
    Ok(Json(tables::browse(&state.db, &table).await?))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

pub async fn recent_bookings(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<RowSet>, FleetError> {
    Ok(Json(bookings::recent(&state.db, query.limit).await?))
}

pub async fn booking_selector(
    _user: CurrentUser,
    State(state): State<FleetState>,
) -> Result<Json<RowSet>, FleetError> {
    Ok(Json(bookings::selector_list(&state.db).await?))
}

pub async fn add_booking(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Json(booking): Json<NewBooking>,
) -> Result<(StatusCode, Json<JsonValue>), FleetError> {
    bookings::add(&state.db, booking).await?;
    Ok((StatusCode::CREATED, Json(json!({"status": "created"}))))
}

pub async fn delete_booking(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Path(booking_id): Path<u64>,
) -> Result<StatusCode, FleetError> {
    if bookings::delete(&state.db, booking_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(FleetError::NotFound(format!(
            "booking {booking_id} does not exist"
        )))
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingTimes {
    pub time_of_booking: NaiveDateTime,
    pub time_of_pickup: NaiveDateTime,
}

pub async fn update_booking_times(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Path(booking_id): Path<u64>,
    Json(times): Json<BookingTimes>,
) -> Result<Json<Ack>, FleetError> {
    let ack = bookings::update_times(
        &state.db,
        booking_id,
        times.time_of_booking,
        times.time_of_pickup,
    )
    .await?;
    Ok(Json(ack))
}

pub async fn list_cars(
    _user: CurrentUser,
    State(state): State<FleetState>,
) -> Result<Json<RowSet>, FleetError> {
    Ok(Json(cars::list(&state.db).await?))
}

pub async fn available_cars(
    _user: CurrentUser,
    State(state): State<FleetState>,
) -> Result<Json<RowSet>, FleetError> {
    Ok(Json(cars::available(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct AssignDriver {
    /// Omit or null to unassign.
    pub driver_id: Option<u32>,
}

pub async fn assign_driver(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Path(registration): Path<String>,
    Json(req): Json<AssignDriver>,
) -> Result<Json<Ack>, FleetError> {
    let ack = cars::assign(&state.db, &registration, req.driver_id).await?;
    Ok(Json(ack))
}

pub async fn add_driver(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Json(driver): Json<NewDriver>,
) -> Result<(StatusCode, Json<JsonValue>), FleetError> {
    drivers::add(&state.db, driver).await?;
    Ok((StatusCode::CREATED, Json(json!({"status": "created"}))))
}

pub async fn driver_bookings(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Path(d_id): Path<u32>,
) -> Result<Json<RowSet>, FleetError> {
    Ok(Json(drivers::bookings(&state.db, d_id).await?))
}

pub async fn driver_revenue(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Path(d_id): Path<u32>,
) -> Result<Json<RowSet>, FleetError> {
    Ok(Json(drivers::revenue(&state.db, d_id).await?))
}

pub async fn driver_shift(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Path(d_id): Path<u32>,
) -> Result<Json<RowSet>, FleetError> {
    Ok(Json(drivers::shift(&state.db, d_id).await?))
}

pub async fn driver_total_revenue(
    _user: CurrentUser,
    State(state): State<FleetState>,
    Path(d_id): Path<u32>,
) -> Result<Json<JsonValue>, FleetError> {
    let total = drivers::total_revenue(&state.db, d_id).await?;
    Ok(Json(json!({"d_id": d_id, "total_revenue": total})))
}
