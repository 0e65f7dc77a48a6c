//! `admingate-authz` — the Resource & Role Authorization Engine.
//!
//! This crate is intentionally decoupled from HTTP and storage: requirements
//! are plain value objects built at route-registration time, subjects are
//! explicit parameters, and the Identity Store is consumed through a trait.
//!
//! Pieces:
//! - [`requirement`]: declarative role/resource requirements with presets.
//! - [`evaluate`]: the pure allow/deny evaluator (SuperAdmin bypass first).
//! - [`cache`]: process-local TTL cache with an injected clock.
//! - [`resolver`]: role/grant resolution from group memberships, through the
//!   cache.
//! - [`token`]: HS256 token issuance and gate-ordered validation.

pub mod cache;
pub mod evaluate;
pub mod requirement;
pub mod resolver;
pub mod subject;
pub mod token;

pub use admingate_identity::RoleLevel;
pub use cache::TtlCache;
pub use evaluate::{Decision, evaluate};
pub use requirement::{
    Combinator, Requirement, ResourceId, ResourceRequirement, ResourceType, RoleRequirement,
};
pub use resolver::{GRANT_TTL_MINUTES, GrantService};
pub use subject::{AuthenticatedSubject, GrantSnapshot};
pub use token::{AuthError, Claims, TokenConfig, TokenIssuer, TokenValidator};
