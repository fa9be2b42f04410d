use std::sync::{Arc, RwLock};

use {
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use wagate_transport::TransportEvent;

use crate::state::SessionState;

#[derive(Debug)]
struct Shared {
    state: SessionState,
    qr: Option<String>,
}

/// Read-only view served by the status endpoint.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct SessionSnapshot {
    pub ready: bool,
    pub has_qr: bool,
}

/// Owner of the session lifecycle state.
///
/// Writes happen only through [`SessionController::apply`], driven by the
/// event loop in [`SessionController::run`]; reads are snapshots taken under
/// the same lock, so a dispatch check never observes a half-applied update.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<RwLock<Shared>>,
}

impl SessionController {
    /// A fresh session, waiting for its first pairing challenge.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(RwLock::new(Shared {
                state: SessionState::AwaitingQr,
                qr: None,
            })),
        }
    }

    /// Consume transport events until the channel closes.
    pub async fn run(self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            self.apply(event);
        }
        debug!("transport event channel closed");
    }

    /// Apply one lifecycle event, enforcing the transition table.
    pub fn apply(&self, event: TransportEvent) {
        let mut shared = self.shared.write().unwrap_or_else(|e| e.into_inner());
        match event {
            TransportEvent::QrIssued { qr } => match shared.state {
                SessionState::AwaitingQr => {
                    info!("pairing challenge updated");
                    shared.qr = Some(qr);
                },
                state => warn!(?state, "ignoring pairing challenge outside the pairing phase"),
            },
            TransportEvent::Authenticated => match shared.state {
                SessionState::AwaitingQr => {
                    info!("transport authenticated");
                    // The challenge stays visible until the ready event.
                    shared.state = SessionState::Authenticated;
                },
                state => warn!(?state, "ignoring authenticated event"),
            },
            TransportEvent::Ready => match shared.state {
                SessionState::AwaitingQr | SessionState::Authenticated => {
                    info!("transport session ready");
                    shared.state = SessionState::Ready;
                    shared.qr = None;
                },
                state => warn!(?state, "ignoring ready event"),
            },
            TransportEvent::AuthFailed { reason } => match shared.state {
                SessionState::AwaitingQr | SessionState::Authenticated | SessionState::Ready => {
                    warn!(reason = %reason, "transport authentication failed");
                    shared.state = SessionState::AuthFailed;
                    shared.qr = None;
                },
                state => warn!(?state, reason = %reason, "ignoring auth failure"),
            },
            TransportEvent::Disconnected { reason } => {
                if shared.state != SessionState::Disconnected {
                    info!(reason = %reason, "transport disconnected");
                }
                shared.state = SessionState::Disconnected;
                shared.qr = None;
            },
        }
    }

    /// Mark the session disconnected outside the event loop (explicit
    /// teardown via the disconnect endpoint).
    pub fn mark_disconnected(&self, reason: &str) {
        self.apply(TransportEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    pub fn state(&self) -> SessionState {
        self.shared
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .state
    }

    /// Current raw pairing challenge, if one is pending.
    pub fn qr_code(&self) -> Option<String> {
        self.shared
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .qr
            .clone()
    }

    pub fn status(&self) -> SessionSnapshot {
        let shared = self.shared.read().unwrap_or_else(|e| e.into_inner());
        SessionSnapshot {
            ready: shared.state.is_ready(),
            has_qr: shared.qr.is_some(),
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qr(payload: &str) -> TransportEvent {
        TransportEvent::QrIssued {
            qr: payload.to_string(),
        }
    }

    #[test]
    fn starts_awaiting_qr_without_challenge() {
        let session = SessionController::new();
        assert_eq!(session.state(), SessionState::AwaitingQr);
        assert!(session.qr_code().is_none());
        let snapshot = session.status();
        assert!(!snapshot.ready && !snapshot.has_qr);
    }

    #[test]
    fn happy_cycle_reaches_ready_and_clears_challenge() {
        let session = SessionController::new();
        session.apply(qr("pairing-1"));
        assert_eq!(session.qr_code().as_deref(), Some("pairing-1"));

        session.apply(TransportEvent::Authenticated);
        assert_eq!(session.state(), SessionState::Authenticated);
        // Not cleared yet; only the ready event clears it.
        assert!(session.qr_code().is_some());

        session.apply(TransportEvent::Ready);
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.qr_code().is_none());
        assert!(session.status().ready);
    }

    #[test]
    fn new_challenge_replaces_the_previous_one() {
        let session = SessionController::new();
        session.apply(qr("first"));
        session.apply(qr("second"));
        assert_eq!(session.qr_code().as_deref(), Some("second"));
    }

    #[test]
    fn restored_session_may_go_ready_without_authenticated() {
        let session = SessionController::new();
        session.apply(TransportEvent::Ready);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn auth_failure_disables_dispatch_and_drops_challenge() {
        let session = SessionController::new();
        session.apply(qr("pairing"));
        session.apply(TransportEvent::AuthFailed {
            reason: "rejected".into(),
        });
        assert_eq!(session.state(), SessionState::AuthFailed);
        assert!(session.qr_code().is_none());
        assert!(!session.status().ready);
    }

    #[test]
    fn disconnect_is_reachable_from_every_state() {
        for setup in [
            Vec::new(),
            vec![TransportEvent::Authenticated],
            vec![TransportEvent::Authenticated, TransportEvent::Ready],
        ] {
            let session = SessionController::new();
            for event in setup {
                session.apply(event);
            }
            session.apply(TransportEvent::Disconnected {
                reason: "gone".into(),
            });
            assert_eq!(session.state(), SessionState::Disconnected);
            assert!(!session.status().ready);
        }
    }

    #[test]
    fn terminal_states_do_not_resurrect() {
        let session = SessionController::new();
        session.apply(TransportEvent::Disconnected {
            reason: "gone".into(),
        });

        session.apply(TransportEvent::Ready);
        session.apply(TransportEvent::Authenticated);
        session.apply(qr("stale"));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.qr_code().is_none());

        let session = SessionController::new();
        session.apply(TransportEvent::AuthFailed {
            reason: "bad".into(),
        });
        session.apply(TransportEvent::Ready);
        assert_eq!(session.state(), SessionState::AuthFailed);
    }

    #[test]
    fn mark_disconnected_behaves_like_the_event() {
        let session = SessionController::new();
        session.apply(TransportEvent::Authenticated);
        session.apply(TransportEvent::Ready);
        session.mark_disconnected("client destroyed");
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn event_loop_applies_channel_events() {
        let (tx, rx) = mpsc::channel(8);
        let session = SessionController::new();
        let task = tokio::spawn(session.clone().run(rx));

        tx.send(qr("pairing")).await.unwrap();
        tx.send(TransportEvent::Authenticated).await.unwrap();
        tx.send(TransportEvent::Ready).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(session.state(), SessionState::Ready);
    }
}
