//! Session extraction and the two access gates.
//!
//! Sessions ride in one private (encrypted, authenticated) cookie. A
//! cookie that does not decrypt under this process's key, for whatever
//! reason, is simply an absent session; tampering and restarts both land
//! on the same 401 path.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};

use crate::auth::{Role, Session};
use crate::error::FleetError;
use crate::router::FleetState;

pub const SESSION_COOKIE: &str = "fleetdesk_session";

/// The session carried by the request, if its cookie decrypts and parses.
pub fn read_session(jar: &PrivateCookieJar) -> Option<Session> {
    let cookie = jar.get(SESSION_COOKIE)?;
    serde_json::from_str(cookie.value()).ok()
}

/// Mints the session cookie into the jar.
pub fn start_session(
    jar: PrivateCookieJar,
    session: &Session,
) -> Result<PrivateCookieJar, FleetError> {
    let payload = serde_json::to_string(session)
        .map_err(|e| FleetError::Internal(format!("session could not be encoded: {e}")))?;
    let cookie = Cookie::build((SESSION_COOKIE, payload))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok(jar.add(cookie))
}

/// Drops the cookie. The session ends right here because nothing else
/// ever stored it.
pub fn end_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Any signed-in operator. Rejects with 401 when the request carries no
/// usable session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

impl FromRequestParts<FleetState> for CurrentUser {
    type Rejection = FleetError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FleetState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .map_err(|err| match err {})?;
        read_session(&jar).map(Self).ok_or(FleetError::Unauthenticated)
    }
}

/// A signed-in administrator. The role check runs here, before the
/// handler body, so a user-role session is refused before any statement
/// is issued on its behalf.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Session);

impl FromRequestParts<FleetState> for AdminUser {
    type Rejection = FleetError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FleetState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(session) = CurrentUser::from_request_parts(parts, state).await?;
        if !session.permits(Role::Admin) {
            return Err(FleetError::Forbidden);
        }
        Ok(Self(session))
    }
}
