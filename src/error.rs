use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

/// Failure taxonomy for the desk. Database-shaped variants carry the
/// engine's own message so constraint violations, missing objects and
/// malformed statements stay distinguishable at the UI.
#[derive(Debug, ThisError)]
pub enum FleetError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("statement failed: {0}")]
    Execution(String),

    #[error("procedure call failed: {0}")]
    Procedure(String),

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("invalid username or password")]
    AuthenticationFailed,

    #[error("sign in required")]
    Unauthenticated,

    #[error("administrator role required")]
    Forbidden,

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FleetError {
    pub fn status(&self) -> StatusCode {
        match self {
            FleetError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            FleetError::Query(_) | FleetError::Execution(_) | FleetError::Procedure(_) => {
                StatusCode::BAD_REQUEST
            }
            FleetError::DuplicateUsername(_) => StatusCode::CONFLICT,
            FleetError::AuthenticationFailed | FleetError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            FleetError::Forbidden => StatusCode::FORBIDDEN,
            FleetError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            FleetError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FleetError::NotFound(_) => StatusCode::NOT_FOUND,
            FleetError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FleetError::Connection(_) => "DB_UNAVAILABLE",
            FleetError::Query(_) => "QUERY_FAILED",
            FleetError::Execution(_) => "EXECUTION_FAILED",
            FleetError::Procedure(_) => "PROCEDURE_FAILED",
            FleetError::DuplicateUsername(_) => "DUPLICATE_USERNAME",
            FleetError::AuthenticationFailed => "AUTH_FAILED",
            FleetError::Unauthenticated => "UNAUTHENTICATED",
            FleetError::Forbidden => "FORBIDDEN",
            FleetError::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            FleetError::InvalidRequest(_) => "INVALID_REQUEST",
            FleetError::NotFound(_) => "NOT_FOUND",
            FleetError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for FleetError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ApiErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            FleetError::Connection("refused".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            FleetError::Query("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            FleetError::DuplicateUsername("alice".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            FleetError::AuthenticationFailed.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(FleetError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(FleetError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            FleetError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn engine_message_survives_verbatim() {
        let e = FleetError::Procedure("PROCEDURE fleetdesk.AddBooking does not exist".into());
        assert!(e.to_string().contains("AddBooking does not exist"));
    }

    #[test]
    fn auth_failure_is_generic() {
        // One message for unknown usernames and wrong passwords alike.
        assert_eq!(
            FleetError::AuthenticationFailed.to_string(),
            "invalid username or password"
        );
    }
}
