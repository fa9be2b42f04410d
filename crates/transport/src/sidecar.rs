//! WebSocket bridge to the browser-automation sidecar.
//!
//! The sidecar owns the messaging protocol (pairing, encryption, browser
//! automation); this module speaks the JSON wire protocol of [`crate::wire`]
//! to it, translates lifecycle frames into [`TransportEvent`]s, and
//! correlates request/reply frames by UUID.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use {
    base64::Engine,
    futures::{SinkExt, StreamExt},
    tokio::{
        net::TcpStream,
        sync::{Mutex, mpsc, oneshot},
    },
    tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message},
    tracing::{debug, info, warn},
    uuid::Uuid,
};

use crate::{
    error::{Error, Result},
    event::TransportEvent,
    process::{SidecarLaunch, SidecarProcess, find_sidecar_dir, start_sidecar},
    session::{OutgoingMedia, SendReceipt, TransportSession},
    wire::{GatewayFrame, SendErrorKind, SidecarFrame},
};

/// Default WebSocket port for the sidecar bridge.
pub const DEFAULT_SIDECAR_PORT: u16 = 3441;

/// Delay between connection attempts while the sidecar process starts up.
const CONNECT_RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(500);

type WsWriter = futures::stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type PendingMap = std::sync::Mutex<HashMap<String, oneshot::Sender<SidecarFrame>>>;

/// Options for starting the sidecar bridge.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Directory containing the sidecar code. Probed when unset.
    pub sidecar_dir: Option<PathBuf>,
    /// WebSocket port the sidecar listens on.
    pub port: u16,
    /// Directory where the sidecar persists session credentials.
    pub auth_dir: Option<PathBuf>,
    /// Spawn the sidecar process. Disable to attach to one started manually.
    pub auto_start: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            sidecar_dir: None,
            port: DEFAULT_SIDECAR_PORT,
            auth_dir: None,
            auto_start: true,
        }
    }
}

struct Inner {
    writer: Mutex<Option<WsWriter>>,
    pending: PendingMap,
    events: mpsc::Sender<TransportEvent>,
    process: Mutex<Option<SidecarProcess>>,
}

/// Production [`TransportSession`] backed by the sidecar process.
#[derive(Clone)]
pub struct SidecarTransport {
    inner: Arc<Inner>,
}

impl SidecarTransport {
    /// Spawn (unless disabled) and connect to the sidecar, then issue the
    /// login frame so the sidecar begins its pairing cycle.
    pub async fn start(
        options: BridgeOptions,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let process = if options.auto_start {
            let dir = find_sidecar_dir(options.sidecar_dir.as_deref())?;
            Some(
                start_sidecar(SidecarLaunch {
                    dir,
                    port: options.port,
                    auth_dir: options.auth_dir.clone(),
                })
                .await?,
            )
        } else {
            None
        };

        let transport = Self::connect_with_retry(options.port, events, 10).await?;
        *transport.inner.process.lock().await = process;

        transport
            .send_frame(&GatewayFrame::Login {
                auth_dir: options.auth_dir,
            })
            .await?;

        Ok(transport)
    }

    /// Connect to a sidecar already listening on `port`.
    pub async fn connect(port: u16, events: mpsc::Sender<TransportEvent>) -> Result<Self> {
        let url = format!("ws://127.0.0.1:{port}");
        let (stream, _) = connect_async(&url)
            .await
            .map_err(|e| Error::wire("connect to sidecar", e))?;
        let (writer, reader) = stream.split();

        let inner = Arc::new(Inner {
            writer: Mutex::new(Some(writer)),
            pending: std::sync::Mutex::new(HashMap::new()),
            events,
            process: Mutex::new(None),
        });

        tokio::spawn(read_loop(reader, Arc::clone(&inner)));
        info!(port, "connected to sidecar");

        Ok(Self { inner })
    }

    /// Connect with retries while the sidecar process is still starting.
    pub async fn connect_with_retry(
        port: u16,
        events: mpsc::Sender<TransportEvent>,
        attempts: usize,
    ) -> Result<Self> {
        let mut last_err = Error::NotConnected;
        for attempt in 1..=attempts {
            match Self::connect(port, events.clone()).await {
                Ok(transport) => return Ok(transport),
                Err(e) => {
                    debug!(attempt, attempts, error = %e, "sidecar not reachable yet");
                    last_err = e;
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                },
            }
        }
        Err(last_err)
    }

    async fn send_frame(&self, frame: &GatewayFrame) -> Result<()> {
        let json = serde_json::to_string(frame).map_err(|e| Error::wire("encode frame", e))?;
        let mut writer = self.inner.writer.lock().await;
        let Some(writer) = writer.as_mut() else {
            return Err(Error::NotConnected);
        };
        writer
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| Error::wire("send frame", e))
    }

    /// Send a request frame and await the correlated reply.
    async fn request(&self, request_id: String, frame: GatewayFrame) -> Result<SidecarFrame> {
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            pending.insert(request_id.clone(), tx);
        }

        if let Err(e) = self.send_frame(&frame).await {
            let mut pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            pending.remove(&request_id);
            return Err(e);
        }

        // The sender side is dropped when the read loop dies.
        rx.await.map_err(|_| Error::NotConnected)
    }
}

#[async_trait::async_trait]
impl TransportSession for SidecarTransport {
    async fn is_registered_user(&self, jid: &str) -> Result<bool> {
        let request_id = Uuid::new_v4().to_string();
        let reply = self
            .request(
                request_id.clone(),
                GatewayFrame::CheckRegistered {
                    request_id,
                    jid: jid.to_string(),
                },
            )
            .await?;

        match reply {
            SidecarFrame::CheckResult { registered, .. } => Ok(registered),
            other => Err(Error::sidecar(format!(
                "unexpected reply to registration check: {other:?}"
            ))),
        }
    }

    async fn send_media(
        &self,
        jid: &str,
        media: OutgoingMedia,
        caption: &str,
    ) -> Result<SendReceipt> {
        let request_id = Uuid::new_v4().to_string();
        let data = base64::engine::general_purpose::STANDARD.encode(&media.data);
        let reply = self
            .request(
                request_id.clone(),
                GatewayFrame::SendMedia {
                    request_id,
                    jid: jid.to_string(),
                    mime_type: media.mime_type,
                    file_name: media.file_name,
                    data,
                    caption: caption.to_string(),
                },
            )
            .await?;

        match reply {
            SidecarFrame::SendResult {
                success: true,
                message_id,
                ..
            } => Ok(SendReceipt {
                message_id: message_id.unwrap_or_default(),
            }),
            SidecarFrame::SendResult {
                error, error_kind, ..
            } => {
                let detail = error.unwrap_or_else(|| "unknown sidecar failure".into());
                match error_kind {
                    Some(SendErrorKind::UnsupportedCodec) => Err(Error::unsupported_codec(detail)),
                    _ => Err(Error::send_rejected(detail)),
                }
            },
            other => Err(Error::sidecar(format!(
                "unexpected reply to send: {other:?}"
            ))),
        }
    }

    async fn destroy(&self) -> Result<()> {
        // Best-effort logout so the sidecar releases the browser session.
        if let Err(e) = self.send_frame(&GatewayFrame::Logout).await {
            debug!(error = %e, "logout frame not delivered");
        }

        {
            let mut writer = self.inner.writer.lock().await;
            if let Some(mut w) = writer.take() {
                let _ = w.close().await;
            }
        }

        let mut process = self.inner.process.lock().await;
        if let Some(mut proc) = process.take() {
            proc.stop().await?;
        }
        Ok(())
    }
}

/// Pump frames from the sidecar until the connection drops.
async fn read_loop(
    mut reader: futures::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    inner: Arc<Inner>,
) {
    while let Some(message) = reader.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<SidecarFrame>(text.as_str()) {
                Ok(frame) => handle_frame(frame, &inner).await,
                Err(e) => warn!(error = %e, "undecodable sidecar frame"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {},
            Err(e) => {
                warn!(error = %e, "sidecar connection error");
                break;
            },
        }
    }

    // Connection gone: drop the writer, fail every in-flight request, and
    // let the session controller know.
    *inner.writer.lock().await = None;
    inner
        .pending
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clear();

    let _ = inner
        .events
        .send(TransportEvent::Disconnected {
            reason: "sidecar connection closed".into(),
        })
        .await;
}

/// Correlation ID of a reply frame, if it is one.
fn reply_request_id(frame: &SidecarFrame) -> Option<&str> {
    match frame {
        SidecarFrame::CheckResult { request_id, .. }
        | SidecarFrame::SendResult { request_id, .. } => Some(request_id),
        _ => None,
    }
}

async fn handle_frame(frame: SidecarFrame, inner: &Inner) {
    // Reply frames are routed to their waiting request.
    if let Some(request_id) = reply_request_id(&frame) {
        let request_id = request_id.to_string();
        let waiter = inner
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&request_id);
        match waiter {
            Some(tx) => {
                let _ = tx.send(frame);
            },
            None => warn!(request_id, "reply frame without a waiting request"),
        }
        return;
    }

    // Everything else is a lifecycle frame for the session controller.
    let event = match frame {
        SidecarFrame::Qr { qr } => {
            debug!("received pairing challenge from sidecar");
            TransportEvent::QrIssued { qr }
        },
        SidecarFrame::Authenticated => TransportEvent::Authenticated,
        SidecarFrame::Ready => TransportEvent::Ready,
        SidecarFrame::AuthFailure { reason } => TransportEvent::AuthFailed { reason },
        SidecarFrame::Disconnected { reason } => TransportEvent::Disconnected { reason },
        SidecarFrame::CheckResult { .. } | SidecarFrame::SendResult { .. } => return,
    };

    if inner.events.send(event).await.is_err() {
        debug!("session controller gone, dropping transport event");
    }
}
