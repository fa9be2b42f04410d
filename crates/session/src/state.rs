//! Session lifecycle states.

/// State of the single transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the pairing challenge to be scanned.
    AwaitingQr,
    /// Authentication succeeded; not yet operational.
    Authenticated,
    /// Fully operational. The only state in which dispatch is permitted.
    Ready,
    /// Authentication was rejected. Requires a new session cycle.
    AuthFailed,
    /// Connection lost. Requires a new session cycle.
    Disconnected,
}

impl SessionState {
    /// Whether dispatch is permitted.
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether the session needs a new cycle to recover.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::AuthFailed | Self::Disconnected)
    }
}
