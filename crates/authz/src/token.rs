//! Token issuance and validation.
//!
//! Tokens are compact three-part HS256 credentials carrying identity, role,
//! and an issuance-time snapshot of menu grants. The snapshot is
//! informational: validation re-checks the live user, and resource decisions
//! re-resolve grants through the [`GrantService`](crate::resolver::GrantService)
//! instead of trusting the embedded claim.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use admingate_core::{Clock, UserId};
use admingate_identity::{IdentityError, IdentityStore, UserRecord};

use crate::resolver::GrantService;
use crate::requirement::ResourceType;
use crate::subject::AuthenticatedSubject;

/// Token signing/validation configuration.
///
/// Defaults exist so dev environments boot without any configuration, but
/// they are not suitable for production; wiring code is expected to warn
/// when a default is in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_minutes: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "dev-secret-change-me".to_string(),
            issuer: "admingate".to_string(),
            audience: "admingate-clients".to_string(),
            expiry_minutes: 60,
        }
    }
}

/// Wire claims of an AdminGate token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: numeric user id, as a string per JWT convention.
    pub sub: String,
    pub name: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub phone: String,
    pub email_confirmed: bool,
    pub role: String,
    /// Menu ids granted at issuance time. A snapshot, not a live view.
    #[serde(default)]
    pub menu_access: Vec<i64>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication failure taxonomy.
///
/// All variants map to "unauthenticated" at the HTTP boundary with one
/// uniform external message; the variant itself is for internal
/// logging/audit only.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token signature verification failed")]
    InvalidSignature,

    #[error("token issuer or audience mismatch")]
    InvalidIssuerOrAudience,

    #[error("token has expired")]
    Expired,

    #[error("token claims are malformed")]
    MalformedClaims,

    #[error("user is inactive, deleted, or missing")]
    UserInactiveOrMissing,

    #[error("username or password is incorrect")]
    InvalidCredentials,

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl AuthError {
    /// The one message shown to callers, identical across variants so the
    /// response does not leak which gate failed.
    pub fn public_message(&self) -> &'static str {
        "invalid credentials"
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
            AuthError::InvalidIssuerOrAudience
        }
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => AuthError::Expired,
        _ => AuthError::MalformedClaims,
    }
}

/// Issues signed tokens for authenticated users.
pub struct TokenIssuer<S> {
    config: Arc<TokenConfig>,
    grants: GrantService<S>,
    clock: Arc<dyn Clock>,
    encoding_key: EncodingKey,
}

impl<S> TokenIssuer<S>
where
    S: IdentityStore,
{
    pub fn new(config: Arc<TokenConfig>, grants: GrantService<S>, clock: Arc<dyn Clock>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            grants,
            clock,
            encoding_key,
        }
    }

    /// Issue a token for the given user.
    ///
    /// Menu grants are resolved fresh at this point and embedded as repeated
    /// claims; the token never tracks later revocations.
    pub async fn issue(&self, user: &UserRecord) -> Result<String, AuthError> {
        let mut menu_access: Vec<i64> = self
            .grants
            .resolve_grants(user.id, ResourceType::Menu)
            .await?
            .into_iter()
            .collect();
        menu_access.sort_unstable();

        let now = self.clock.now();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.username.clone(),
            email: user.email.clone(),
            given_name: user.first_name.clone(),
            family_name: user.last_name.clone(),
            phone: user.phone.clone(),
            email_confirmed: user.email_confirmed,
            role: user.role_level.to_string(),
            menu_access,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.expiry_minutes)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::MalformedClaims)
    }
}

/// Validates incoming tokens against configuration and the live user record.
pub struct TokenValidator<S> {
    config: Arc<TokenConfig>,
    store: S,
    clock: Arc<dyn Clock>,
    decoding_key: DecodingKey,
}

impl<S> TokenValidator<S>
where
    S: IdentityStore,
{
    pub fn new(config: Arc<TokenConfig>, store: S, clock: Arc<dyn Clock>) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            store,
            clock,
            decoding_key,
        }
    }

    /// Validate a compact token. Gates run in order; the first failure wins.
    ///
    /// 1. Signature.
    /// 2. Issuer/audience against configuration.
    /// 3. Expiry, zero clock-skew tolerance.
    /// 4. Numeric subject claim.
    /// 5. Live user re-check (exists, active, not deleted).
    pub async fn validate(&self, token: &str) -> Result<AuthenticatedSubject, AuthError> {
        // Issuer/audience/expiry are checked manually below so gate order and
        // skew tolerance stay ours, not the library's.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = Default::default();

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(map_decode_error)?;
        let claims = data.claims;

        if claims.iss != self.config.issuer || claims.aud != self.config.audience {
            return Err(AuthError::InvalidIssuerOrAudience);
        }

        if self.clock.now().timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AuthError::MalformedClaims)?;
        let role_level = claims
            .role
            .parse()
            .map_err(|_| AuthError::MalformedClaims)?;

        let live = self
            .store
            .find_user(user_id)
            .await?
            .filter(|u| u.is_usable());
        if live.is_none() {
            return Err(AuthError::UserInactiveOrMissing);
        }

        // Identity/role come from the token; grants deliberately do not.
        Ok(AuthenticatedSubject {
            user_id,
            username: claims.name,
            email: claims.email,
            role_level,
        })
    }
}
