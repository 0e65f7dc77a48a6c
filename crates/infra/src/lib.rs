//! Infrastructure adapters for the Identity Store boundary.

pub mod identity;

#[cfg(feature = "postgres")]
pub use identity::postgres::PostgresIdentityStore;
