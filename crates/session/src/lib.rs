//! Session lifecycle controller.
//!
//! Owns the single transport session's state and the latest pairing
//! challenge. The controller's event loop is the sole consumer of the
//! transport event channel and the sole writer of session state; everything
//! else gets read-only snapshots.

pub mod controller;
pub mod state;

pub use {
    controller::{SessionController, SessionSnapshot},
    state::SessionState,
};
