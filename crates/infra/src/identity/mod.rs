//! Identity Store adapters.
//!
//! The in-memory implementation lives with the trait in
//! `admingate-identity`; this module holds the database-backed ones.

#[cfg(feature = "postgres")]
pub mod postgres;
