//! HTTP API: server, routing, and request/response mapping.
//!
//! The authorization engine itself lives in `admingate-authz`; this crate is
//! the boundary that recovers a subject from the bearer token, threads it
//! through request extensions, and maps engine outcomes to 401/403.

pub mod app;
pub mod config;
pub mod errors;
pub mod guard;
pub mod middleware;
pub mod routes;
