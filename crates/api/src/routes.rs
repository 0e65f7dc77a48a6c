//! HTTP routes and handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use admingate_authz::{
    AuthError, AuthenticatedSubject, Requirement, ResourceRequirement, ResourceType,
    RoleRequirement,
};
use admingate_core::MenuId;

use crate::app::AppState;
use crate::errors;
use crate::guard::require;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /auth/login: verify credentials and issue a token.
///
/// Bad username, bad password, and deactivated account are all the same
/// uniform 401.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> axum::response::Response {
    let user = match state.store.find_user_by_username(&payload.username).await {
        Ok(user) => user,
        Err(e) => return errors::unauthenticated(&AuthError::Identity(e)),
    };

    let Some(user) = user.filter(|u| u.is_usable()) else {
        return errors::unauthenticated(&AuthError::InvalidCredentials);
    };

    if !(state.verify_password)(&payload.password, &user.password_hash) {
        return errors::unauthenticated(&AuthError::InvalidCredentials);
    }

    match state.issuer.issue(&user).await {
        Ok(token) => {
            tracing::info!(user_id = %user.id, "login succeeded");
            (StatusCode::OK, Json(LoginResponse { token })).into_response()
        }
        Err(e) => errors::unauthenticated(&e),
    }
}

/// GET /auth/me: the authenticated subject plus *live* menu grants.
///
/// Grants here come from the resolver, not the token snapshot, so this
/// endpoint reflects membership changes within one TTL window.
pub async fn me(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthenticatedSubject>,
) -> axum::response::Response {
    let menu_grants = match state
        .grants
        .resolve_grants(subject.user_id, ResourceType::Menu)
        .await
    {
        Ok(grants) => {
            let mut ids: Vec<i64> = grants.into_iter().collect();
            ids.sort_unstable();
            ids
        }
        Err(e) => {
            tracing::warn!(user_id = %subject.user_id, error = %e, "grant resolution failed");
            return errors::json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "identity_unavailable",
                "identity store unavailable",
            );
        }
    };

    Json(serde_json::json!({
        "user_id": subject.user_id,
        "username": subject.username,
        "email": subject.email,
        "role": subject.role_level.as_str(),
        "menu_grants": menu_grants,
    }))
    .into_response()
}

/// GET /admin/overview: SubAdmin or above.
pub async fn admin_overview(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthenticatedSubject>,
) -> axum::response::Response {
    let requirement = Requirement::Role(RoleRequirement::admin());
    if let Err(denied) = require(&state, &subject, &requirement).await {
        return denied;
    }

    Json(serde_json::json!({ "section": "overview" })).into_response()
}

/// GET /admin/settings: SuperAdmin only.
pub async fn admin_settings(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthenticatedSubject>,
) -> axum::response::Response {
    let requirement = Requirement::Role(RoleRequirement::super_admin_only());
    if let Err(denied) = require(&state, &subject, &requirement).await {
        return denied;
    }

    Json(serde_json::json!({ "section": "settings" })).into_response()
}

/// GET /menus/:id, gated on the caller holding a grant for that menu.
pub async fn menu_entry(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthenticatedSubject>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let requirement =
        Requirement::Resource(ResourceRequirement::any_of_menus([MenuId::new(id)]));
    if let Err(denied) = require(&state, &subject, &requirement).await {
        return denied;
    }

    Json(serde_json::json!({ "menu_id": id })).into_response()
}
