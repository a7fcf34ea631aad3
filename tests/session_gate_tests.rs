//! Session-gate tests that run without any database. The pool points at a
//! closed port, so every test that still gets a 401 or 403 proves the gate
//! fired before a single statement was attempted.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::FromRef;
use axum::http::{Request, StatusCode, header};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Key, PrivateCookieJar};
use chrono::Utc;
use tower::ServiceExt;

use fleetdesk::auth::{Role, Session};
use fleetdesk::config::DatabaseConfig;
use fleetdesk::db::Database;
use fleetdesk::middleware::auth::start_session;
use fleetdesk::router::{FleetState, fleet_router};

/// A pool aimed at a port nothing listens on. Connection attempts fail
/// fast with a refusal, never a hang.
fn unreachable_db() -> Database {
    let cfg = DatabaseConfig {
        host: "127.0.0.1".into(),
        port: 1,
        username: "fleetdesk".into(),
        password: String::new(),
        database: "fleetdesk".into(),
        max_connections: 2,
        acquire_timeout_secs: 2,
    };
    Database::connect(&cfg)
}

fn app_and_state() -> (Router, FleetState) {
    let state = FleetState::new(unreachable_db());
    (fleet_router(state.clone()), state)
}

/// Encrypts a session under the state's own cookie key and returns the
/// `name=value` pair ready for a Cookie header.
fn session_cookie_for(state: &FleetState, role: Role) -> String {
    let jar = PrivateCookieJar::new(Key::from_ref(state));
    let session = Session {
        user_id: 9,
        username: "desk".into(),
        role,
        started_at: Utc::now(),
    };
    let jar = start_session(jar, &session).expect("session encodes");
    let response = (jar, "").into_response();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("ascii cookie")
        .to_owned();
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_owned()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn anonymous_requests_get_401() {
    let (app, _state) = app_and_state();
    for uri in ["/auth/me", "/api/dashboard", "/api/cars", "/admin/accounts"] {
        let resp = app.clone().oneshot(get(uri)).await.expect("request");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "uri {uri}");
        let body = body_string(resp).await;
        assert!(body.contains("UNAUTHENTICATED"), "uri {uri}: {body}");
    }
}

#[tokio::test]
async fn user_sessions_are_refused_at_admin_routes_before_any_statement() {
    let (app, state) = app_and_state();
    let cookie = session_cookie_for(&state, Role::User);

    // 403, not 503: with no database behind the pool, a 503 would mean
    // the handler body ran. The gate must answer first.
    for uri in ["/admin/accounts", "/admin/db-accounts"] {
        let request = if uri == "/admin/accounts" {
            get_with_cookie(uri, &cookie)
        } else {
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"rpt","password":"Xyz12345"}"#,
                ))
                .expect("build request")
        };
        let resp = app.clone().oneshot(request).await.expect("request");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "uri {uri}");
        let body = body_string(resp).await;
        assert!(body.contains("FORBIDDEN"), "uri {uri}: {body}");
    }
}

#[tokio::test]
async fn admin_sessions_pass_the_gate_and_hit_the_missing_database() {
    let (app, state) = app_and_state();
    let cookie = session_cookie_for(&state, Role::Admin);

    let resp = app
        .oneshot(get_with_cookie("/admin/accounts", &cookie))
        .await
        .expect("request");
    // The gate let the admin through; the failure is the pool's.
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_string(resp).await;
    assert!(body.contains("DB_UNAVAILABLE"), "{body}");
}

#[tokio::test]
async fn admin_sessions_also_clear_user_level_gates() {
    let (app, state) = app_and_state();
    let cookie = session_cookie_for(&state, Role::Admin);

    let resp = app
        .oneshot(get_with_cookie("/auth/me", &cookie))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("\"role\":\"admin\""), "{body}");
    assert!(body.contains("\"username\":\"desk\""), "{body}");
}

#[tokio::test]
async fn tampered_cookies_are_anonymous() {
    let (app, _state) = app_and_state();

    let resp = app
        .clone()
        .oneshot(get_with_cookie(
            "/auth/me",
            "fleetdesk_session=not-an-encrypted-value",
        ))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cookies_from_another_process_key_are_anonymous() {
    let (app, _state) = app_and_state();
    // Minted under a different state, so a different generated key.
    let (_other_app, other_state) = app_and_state();
    let foreign_cookie = session_cookie_for(&other_state, Role::Admin);

    let resp = app
        .oneshot(get_with_cookie("/auth/me", &foreign_cookie))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_the_database_as_unavailable() {
    let (app, _state) = app_and_state();

    let resp = app.oneshot(get("/health")).await.expect("request");
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_string(resp).await;
    assert!(body.contains("DB_UNAVAILABLE"), "{body}");
}

#[tokio::test]
async fn login_surfaces_infrastructure_failure_as_503_not_401() {
    let (app, _state) = app_and_state();

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"admin","password":"admin123"}"#))
                .expect("build request"),
        )
        .await
        .expect("request");
    // A dead database must not masquerade as bad credentials.
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
