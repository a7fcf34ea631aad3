//! Shared state and the route table.

use axum::extract::{FromRef, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use axum_extra::extract::cookie::Key;
use serde_json::{Value as JsonValue, json};

use crate::auth::CredentialStore;
use crate::db::Database;
use crate::error::FleetError;
use crate::handlers::{admin, auth, fleet};

#[derive(Clone)]
pub struct FleetState {
    pub db: Database,
    pub store: CredentialStore,
    cookie_key: Key,
}

impl FleetState {
    /// The cookie key is generated fresh here, never loaded or stored, so
    /// every session dies with the process.
    pub fn new(db: Database) -> Self {
        let store = CredentialStore::new(db.clone());
        Self {
            db,
            store,
            cookie_key: Key::generate(),
        }
    }
}

impl FromRef<FleetState> for Key {
    fn from_ref(state: &FleetState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn fleet_router(state: FleetState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/api/dashboard", get(fleet::overview))
        .route("/api/tables", get(fleet::list_tables))
        .route("/api/tables/{table}", get(fleet::browse_table))
        .route(
            "/api/bookings",
            get(fleet::booking_selector).post(fleet::add_booking),
        )
        .route("/api/bookings/recent", get(fleet::recent_bookings))
        .route("/api/bookings/{booking_id}", delete(fleet::delete_booking))
        .route(
            "/api/bookings/{booking_id}/times",
            put(fleet::update_booking_times),
        )
        .route("/api/cars", get(fleet::list_cars))
        .route("/api/cars/available", get(fleet::available_cars))
        .route("/api/cars/{registration}/driver", put(fleet::assign_driver))
        .route("/api/drivers", post(fleet::add_driver))
        .route("/api/drivers/{d_id}/bookings", get(fleet::driver_bookings))
        .route("/api/drivers/{d_id}/revenue", get(fleet::driver_revenue))
        .route("/api/drivers/{d_id}/shift", get(fleet::driver_shift))
        .route(
            "/api/drivers/{d_id}/total-revenue",
            get(fleet::driver_total_revenue),
        )
        .route(
            "/admin/accounts",
            get(admin::list_accounts).post(admin::create_account),
        )
        .route("/admin/accounts/{user_id}", delete(admin::delete_account))
        .route("/admin/db-accounts", post(admin::create_db_account))
        .route("/admin/db-accounts/grant", post(admin::grant_privileges))
        .route("/admin/db-accounts/revoke", post(admin::revoke_privileges))
        .route("/admin/db-accounts/{username}", delete(admin::drop_db_account))
        .route("/admin/sql", post(admin::run_sql))
        .with_state(state)
}

/// Liveness plus database reachability in one check.
async fn health(State(state): State<FleetState>) -> Result<Json<JsonValue>, FleetError> {
    state.db.ping().await?;
    Ok(Json(json!({"status": "ok"})))
}
