//! Environment-driven configuration for the wagate gateway.
//!
//! Values come from the process environment (optionally seeded from a
//! `config.env` / `.env` file by the CLI): `PORT`, `UPLOAD_PATH`, plus
//! `WAGATE_*` variables for the bind address and the sidecar bridge.

pub mod schema;

pub use schema::{GatewayConfig, SidecarSettings};
