//! Requirement enforcement at the handler boundary.

use axum::response::Response;

use admingate_authz::{
    AuthenticatedSubject, GrantSnapshot, Requirement, ResourceType, evaluate,
};

use crate::app::AppState;
use crate::errors;

/// Enforce a requirement for an already-authenticated subject.
///
/// The subject's role comes from the token; resource grants are re-resolved
/// live through the cache (the token's embedded grant claims are never a
/// decision input here). A denied requirement is 403; an identity-store
/// fault also denies, fail-closed.
pub async fn require(
    state: &AppState,
    subject: &AuthenticatedSubject,
    requirement: &Requirement,
) -> Result<(), Response> {
    let menu_grants = match state
        .grants
        .resolve_grants(subject.user_id, ResourceType::Menu)
        .await
    {
        Ok(grants) => grants,
        Err(e) => {
            tracing::warn!(user_id = %subject.user_id, error = %e, "grant resolution failed; denying");
            return Err(errors::forbidden());
        }
    };

    let snapshot =
        GrantSnapshot::new(subject.role_level).with_grants(ResourceType::Menu, menu_grants);

    if evaluate(requirement, &snapshot).is_allowed() {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %subject.user_id,
            role = %subject.role_level,
            "requirement denied"
        );
        Err(errors::forbidden())
    }
}
