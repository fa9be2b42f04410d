//! The transport capability consumed by the dispatch pipeline.

use {async_trait::async_trait, bytes::Bytes};

use crate::error::Result;

/// One resolved unit of outgoing content handed to the transport.
#[derive(Debug, Clone)]
pub struct OutgoingMedia {
    /// Declared MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Original file name, used by the recipient client for display.
    pub file_name: String,
    /// Raw payload bytes.
    pub data: Bytes,
}

/// Receipt returned by the transport for an accepted send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Transport-assigned message identifier.
    pub message_id: String,
}

/// A live messaging session the gateway drives. One instance exists per
/// process; callers must not issue two concurrent sends against it.
#[async_trait]
pub trait TransportSession: Send + Sync {
    /// Whether the given canonical address belongs to a registered user.
    async fn is_registered_user(&self, jid: &str) -> Result<bool>;

    /// Send one media payload with an optional caption.
    async fn send_media(
        &self,
        jid: &str,
        media: OutgoingMedia,
        caption: &str,
    ) -> Result<SendReceipt>;

    /// Tear the session down, releasing the underlying automation browser.
    async fn destroy(&self) -> Result<()>;
}
