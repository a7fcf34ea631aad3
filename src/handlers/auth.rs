//! Sign-in, sign-up, sign-out and session introspection.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::{Account, Role, Session};
use crate::error::FleetError;
use crate::middleware::auth::{CurrentUser, end_session, start_session};
use crate::router::FleetState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Verifies the credentials and mints the session cookie. Failures are
/// one generic 401 regardless of which half was wrong.
pub async fn login(
    State(state): State<FleetState>,
    jar: PrivateCookieJar,
    Json(req): Json<Credentials>,
) -> Result<(PrivateCookieJar, Json<Session>), FleetError> {
    let account = state.store.verify(&req.username, &req.password).await?;
    let session = Session {
        user_id: account.user_id,
        username: account.username,
        role: account.role,
        started_at: Utc::now(),
    };
    let jar = start_session(jar, &session)?;
    info!(username = %session.username, role = %session.role, "operator signed in");
    Ok((jar, Json(session)))
}

/// Self-service account creation, always at user level. Admin accounts
/// only come from an administrator.
pub async fn signup(
    State(state): State<FleetState>,
    Json(req): Json<Credentials>,
) -> Result<(StatusCode, Json<Account>), FleetError> {
    let user_id = state
        .store
        .create_account(&req.username, &req.password, Role::User)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Account {
            user_id,
            username: req.username,
            role: Role::User,
        }),
    ))
}

pub async fn logout(
    CurrentUser(session): CurrentUser,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, StatusCode) {
    info!(username = %session.username, "operator signed out");
    (end_session(jar), StatusCode::NO_CONTENT)
}

pub async fn me(CurrentUser(session): CurrentUser) -> Json<Session> {
    Json(session)
}
