//! HTTP surface and dispatch orchestration for wagate.
//!
//! Routes mirror the public API (`/status`, `/qr`, the `/send-*` family,
//! `/disconnect`); the dispatch module owns the validation → registration →
//! resolution → send pipeline and its cleanup guarantees.

pub mod dispatch;
pub mod error;
pub mod extract;
pub mod qr;
pub mod routes;
pub mod server;

pub use {
    dispatch::{ItemOutcome, MediaItem},
    error::DispatchError,
    server::{AppState, build_app, run, run_until_shutdown},
};
