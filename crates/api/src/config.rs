//! Environment configuration for the API process.

use admingate_authz::TokenConfig;

/// Read token configuration from the environment.
///
/// Every value has a dev default; each default that ends up in effect is
/// logged as a warning because none of them are suitable for production.
pub fn token_config_from_env() -> TokenConfig {
    let defaults = TokenConfig::default();

    let secret = std::env::var("ADMINGATE_JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("ADMINGATE_JWT_SECRET not set; using insecure dev default");
        defaults.secret.clone()
    });

    let issuer = std::env::var("ADMINGATE_JWT_ISSUER").unwrap_or_else(|_| {
        tracing::warn!("ADMINGATE_JWT_ISSUER not set; using dev default");
        defaults.issuer.clone()
    });

    let audience = std::env::var("ADMINGATE_JWT_AUDIENCE").unwrap_or_else(|_| {
        tracing::warn!("ADMINGATE_JWT_AUDIENCE not set; using dev default");
        defaults.audience.clone()
    });

    let expiry_minutes = std::env::var("ADMINGATE_JWT_EXPIRY_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|minutes| *minutes > 0)
        .unwrap_or(defaults.expiry_minutes);

    TokenConfig {
        secret,
        issuer,
        audience,
        expiry_minutes,
    }
}
