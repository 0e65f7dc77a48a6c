//! Bearer-token authentication middleware.

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use admingate_authz::AuthError;

use crate::app::AppState;
use crate::errors;

/// Recover the authenticated subject from the Authorization header and stash
/// it in request extensions. Any failure is a uniform 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| {
        errors::unauthenticated(&AuthError::MalformedClaims)
    })?;

    let subject = state
        .validator
        .validate(token)
        .await
        .map_err(|e| errors::unauthenticated(&e))?;

    req.extensions_mut().insert(subject);

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() { None } else { Some(token) }
}
