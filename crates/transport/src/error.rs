use std::error::Error as StdError;

/// Crate-wide result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed transport errors. The dispatch pipeline matches on these kinds;
/// free-text sniffing of error messages is never required.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No live connection to the sidecar.
    #[error("transport is not connected")]
    NotConnected,

    /// The transport rejected the media encoding (e.g. an unlicensed
    /// video codec the automation browser cannot decode).
    #[error("unsupported media codec: {detail}")]
    UnsupportedCodec { detail: String },

    /// The sidecar reported a send failure.
    #[error("transport send failed: {detail}")]
    SendRejected { detail: String },

    /// The sidecar process could not be located, spawned, or spoken to.
    #[error("sidecar unavailable: {message}")]
    Sidecar { message: String },

    /// Wrapped failure from the wire (WebSocket, serialization).
    #[error("transport wire error: {context}: {source}")]
    Wire {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn unsupported_codec(detail: impl Into<String>) -> Self {
        Self::UnsupportedCodec {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn send_rejected(detail: impl Into<String>) -> Self {
        Self::SendRejected {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn sidecar(message: impl Into<String>) -> Self {
        Self::Sidecar {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn wire(context: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Wire {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
