//! Application state and router wiring.

use std::sync::Arc;

use axum::{Router, middleware::from_fn_with_state, routing::get, routing::post};
use sha2::{Digest, Sha256};
use tower::ServiceBuilder;

use admingate_authz::{GrantService, TokenConfig, TokenIssuer, TokenValidator};
use admingate_core::{Clock, SystemClock};
use admingate_identity::IdentityStore;

use crate::{middleware, routes};

/// Object-safe handle to whatever identity backend is wired in.
pub type DynIdentityStore = Arc<dyn IdentityStore>;

/// Opaque one-way password check: `(candidate, stored_hash) -> bool`.
///
/// Hashing mechanics are outside this system; swap this closure to plug in a
/// real KDF.
pub type PasswordVerifier = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Dev-only verifier: unsalted SHA-256 hex compare. Not suitable for
/// production password storage.
pub fn dev_password_verifier() -> PasswordVerifier {
    Arc::new(|candidate, stored_hash| {
        let digest = hex::encode(Sha256::digest(candidate.as_bytes()));
        digest == stored_hash
    })
}

#[derive(Clone)]
pub struct AppState {
    pub store: DynIdentityStore,
    pub grants: GrantService<DynIdentityStore>,
    pub issuer: Arc<TokenIssuer<DynIdentityStore>>,
    pub validator: Arc<TokenValidator<DynIdentityStore>>,
    pub verify_password: PasswordVerifier,
}

/// Wire the engine components around an identity backend.
pub fn build_state(config: TokenConfig, store: DynIdentityStore) -> AppState {
    build_state_with_clock(config, store, Arc::new(SystemClock))
}

pub fn build_state_with_clock(
    config: TokenConfig,
    store: DynIdentityStore,
    clock: Arc<dyn Clock>,
) -> AppState {
    let config = Arc::new(config);
    let grants = GrantService::new(store.clone(), clock.clone());
    let issuer = Arc::new(TokenIssuer::new(
        config.clone(),
        grants.clone(),
        clock.clone(),
    ));
    let validator = Arc::new(TokenValidator::new(config, store.clone(), clock));

    AppState {
        store,
        grants,
        issuer,
        validator,
        verify_password: dev_password_verifier(),
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: AppState) -> Router {
    // Protected routes: subject recovered from the bearer token.
    let protected = Router::new()
        .route("/auth/me", get(routes::me))
        .route("/admin/overview", get(routes::admin_overview))
        .route("/admin/settings", get(routes::admin_settings))
        .route("/menus/:id", get(routes::menu_entry))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route("/auth/login", post(routes::login))
        .merge(protected)
        .with_state(state)
        .layer(ServiceBuilder::new())
}
