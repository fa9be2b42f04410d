//! Lifecycle events emitted by a transport session.

/// Events the transport pushes to the session controller. The controller is
/// the sole consumer; it owns all resulting session-state mutation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportEvent {
    /// A new scannable pairing challenge was issued.
    QrIssued { qr: String },
    /// Authentication succeeded; the session is not yet operational.
    Authenticated,
    /// The session is fully operational and may dispatch.
    Ready,
    /// Authentication was rejected.
    AuthFailed { reason: String },
    /// The underlying connection was lost.
    Disconnected { reason: String },
}
