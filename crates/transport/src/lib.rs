//! Messaging transport capability for the wagate gateway.
//!
//! Defines the [`TransportSession`] trait the dispatch pipeline drives, the
//! lifecycle [`TransportEvent`]s the session controller consumes, and the
//! production [`SidecarTransport`] that bridges to a browser-automation
//! sidecar process over a local WebSocket.

pub mod error;
pub mod event;
pub mod jid;
pub mod process;
pub mod session;
pub mod sidecar;
pub mod wire;

pub use {
    error::{Error, Result},
    event::TransportEvent,
    jid::{JID_SUFFIX, normalize_jid},
    process::{SidecarLaunch, SidecarProcess, find_sidecar_dir, start_sidecar},
    session::{OutgoingMedia, SendReceipt, TransportSession},
    sidecar::{BridgeOptions, DEFAULT_SIDECAR_PORT, SidecarTransport},
};
