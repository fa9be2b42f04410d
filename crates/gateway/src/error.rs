use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Dispatch pipeline errors as reported to callers.
///
/// Validation failures map to 400 with a specific message; transport and
/// filesystem failures map to 500 with the underlying message attached as
/// `details`. Matching is always on the kind, never on message text.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("client is not ready. Scan the QR code first")]
    SessionNotReady,

    #[error("phone number is required")]
    MissingAddress,

    #[error("media file is required")]
    MissingMedia,

    #[error("number is not registered on WhatsApp")]
    RecipientNotRegistered,

    /// Endpoint-level constraint of the document endpoints.
    #[error("only document files are allowed for this endpoint (got {mime_type})")]
    NotADocument { mime_type: String },

    /// Malformed upload request (unreadable multipart, too many files).
    #[error("invalid upload request: {detail}")]
    BadRequest { detail: String },

    #[error(transparent)]
    Media(#[from] wagate_media::Error),

    #[error("error sending media")]
    Send(#[source] wagate_transport::Error),

    #[error("error disconnecting client")]
    Teardown(#[source] wagate_transport::Error),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotReady
            | Self::MissingAddress
            | Self::MissingMedia
            | Self::RecipientNotRegistered
            | Self::NotADocument { .. }
            | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Media(wagate_media::Error::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Media(_) => StatusCode::BAD_REQUEST,
            Self::Send(wagate_transport::Error::UnsupportedCodec { .. }) => {
                StatusCode::BAD_REQUEST
            },
            Self::Send(_) | Self::Teardown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message recorded against a single batch item. Unlike the top-level
    /// body, this carries the specific transport detail inline.
    pub fn item_message(&self) -> String {
        match self {
            Self::Send(source) => source.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let (message, details) = match &self {
            Self::Send(source @ wagate_transport::Error::UnsupportedCodec { .. }) => (
                "video format not supported. Try converting to MP4 with H.264 codec".to_string(),
                Some(source.to_string()),
            ),
            Self::Send(source) | Self::Teardown(source) => {
                (self.to_string(), Some(source.to_string()))
            },
            _ => (self.to_string(), None),
        };

        let mut body = serde_json::json!({ "error": message });
        if let Some(details) = details {
            body["details"] = serde_json::Value::String(details);
        }

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_client_errors() {
        assert_eq!(DispatchError::SessionNotReady.status(), StatusCode::BAD_REQUEST);
        assert_eq!(DispatchError::MissingAddress.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            DispatchError::Media(wagate_media::Error::UnsupportedMediaType {
                mime_type: "audio/mpeg".into(),
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn codec_rejections_are_client_errors_other_send_failures_are_not() {
        let codec = DispatchError::Send(wagate_transport::Error::unsupported_codec("no H.264"));
        assert_eq!(codec.status(), StatusCode::BAD_REQUEST);

        let refused = DispatchError::Send(wagate_transport::Error::send_rejected("boom"));
        assert_eq!(refused.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn item_message_carries_transport_detail() {
        let err = DispatchError::Send(wagate_transport::Error::send_rejected("peer vanished"));
        assert!(err.item_message().contains("peer vanished"));
    }
}
