//! Administrator-only surface: operator accounts, database accounts, and
//! the SQL console. Every handler takes [`AdminUser`], so the role check
//! happens before any of these bodies run.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tracing::info;

use crate::auth::{Account, Role};
use crate::error::FleetError;
use crate::fleet::grants::{self, GrantRequest, NewDbAccount};
use crate::fleet::sql_console::{self, ConsoleOutcome};
use crate::middleware::auth::AdminUser;
use crate::router::FleetState;

pub async fn list_accounts(
    _admin: AdminUser,
    State(state): State<FleetState>,
) -> Result<Json<Vec<Account>>, FleetError> {
    Ok(Json(state.store.list_accounts().await?))
}

#[derive(Debug, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

pub async fn create_account(
    _admin: AdminUser,
    State(state): State<FleetState>,
    Json(req): Json<NewAccount>,
) -> Result<(StatusCode, Json<Account>), FleetError> {
    let user_id = state
        .store
        .create_account(&req.username, &req.password, req.role)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Account {
            user_id,
            username: req.username,
            role: req.role,
        }),
    ))
}

pub async fn delete_account(
    _admin: AdminUser,
    State(state): State<FleetState>,
    Path(user_id): Path<u64>,
) -> Result<StatusCode, FleetError> {
    if state.store.delete_account(user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(FleetError::NotFound(format!(
            "account {user_id} does not exist"
        )))
    }
}

pub async fn create_db_account(
    _admin: AdminUser,
    State(state): State<FleetState>,
    Json(req): Json<NewDbAccount>,
) -> Result<(StatusCode, Json<JsonValue>), FleetError> {
    grants::create_db_account(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(json!({"status": "created"}))))
}

pub async fn grant_privileges(
    _admin: AdminUser,
    State(state): State<FleetState>,
    Json(req): Json<GrantRequest>,
) -> Result<Json<JsonValue>, FleetError> {
    grants::grant(&state.db, &req).await?;
    Ok(Json(json!({"status": "granted"})))
}

pub async fn revoke_privileges(
    _admin: AdminUser,
    State(state): State<FleetState>,
    Json(req): Json<GrantRequest>,
) -> Result<Json<JsonValue>, FleetError> {
    grants::revoke(&state.db, &req).await?;
    Ok(Json(json!({"status": "revoked"})))
}

#[derive(Debug, Deserialize)]
pub struct DropDbAccount {
    pub host: Option<String>,
}

pub async fn drop_db_account(
    _admin: AdminUser,
    State(state): State<FleetState>,
    Path(username): Path<String>,
    Query(query): Query<DropDbAccount>,
) -> Result<StatusCode, FleetError> {
    let host = query.host.unwrap_or_else(|| "localhost".into());
    grants::drop_db_account(&state.db, &username, &host).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SqlRequest {
    pub sql: String,
}

pub async fn run_sql(
    AdminUser(session): AdminUser,
    State(state): State<FleetState>,
    Json(req): Json<SqlRequest>,
) -> Result<Json<ConsoleOutcome>, FleetError> {
    let outcome = sql_console::run(&state.db, &req.sql).await?;
    info!(username = %session.username, "console statement run");
    Ok(Json(outcome))
}
