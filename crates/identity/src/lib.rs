//! `admingate-identity` — the Identity Store boundary.
//!
//! The authorization engine never talks to a database directly; it consumes
//! the read-only [`IdentityStore`] trait defined here. Records carry the
//! `is_active`/`is_deleted` soft-state flags, and every query implementation
//! must filter on them: deactivated or soft-deleted rows never contribute to
//! a role or a grant.

pub mod memory;
pub mod record;
pub mod store;

pub use memory::InMemoryIdentityStore;
pub use record::{GroupMenuRecord, GroupRecord, GroupUserRecord, RoleLevel, UserRecord};
pub use store::{IdentityError, IdentityStore};
