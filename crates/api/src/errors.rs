//! Consistent error responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use admingate_authz::AuthError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 401 with the uniform external message.
///
/// The concrete failure (bad signature vs expired vs deactivated user) goes
/// to the log only, so responses do not reveal which gate rejected the
/// caller.
pub fn unauthenticated(err: &AuthError) -> axum::response::Response {
    tracing::debug!(reason = %err, "authentication rejected");
    json_error(
        StatusCode::UNAUTHORIZED,
        "unauthenticated",
        err.public_message(),
    )
}

/// 403 for an authenticated caller that failed a requirement.
pub fn forbidden() -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", "access denied")
}
