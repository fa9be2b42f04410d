//! JSON wire protocol between the gateway and the sidecar.
//!
//! Both directions are tagged enums; the tag names are part of the sidecar
//! contract and must stay stable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Frames sent from the gateway to the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayFrame {
    /// Begin (or resume) a session. Credentials persist under `auth_dir`.
    Login {
        #[serde(skip_serializing_if = "Option::is_none")]
        auth_dir: Option<PathBuf>,
    },
    /// Ask whether an address belongs to a registered user.
    CheckRegistered { request_id: String, jid: String },
    /// Send one media payload.
    SendMedia {
        request_id: String,
        jid: String,
        mime_type: String,
        file_name: String,
        /// Base64-encoded payload bytes.
        data: String,
        caption: String,
    },
    /// Tear the session down.
    Logout,
}

/// Frames received from the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidecarFrame {
    /// A new pairing challenge. Replaces any previous one.
    Qr { qr: String },
    Authenticated,
    Ready,
    AuthFailure { reason: String },
    Disconnected { reason: String },
    /// Reply to [`GatewayFrame::CheckRegistered`].
    CheckResult { request_id: String, registered: bool },
    /// Reply to [`GatewayFrame::SendMedia`].
    SendResult {
        request_id: String,
        success: bool,
        #[serde(default)]
        message_id: Option<String>,
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        error_kind: Option<SendErrorKind>,
    },
}

/// Structured failure kind attached to a failed send. Replaces the old
/// substring matching on error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendErrorKind {
    /// The automation browser cannot decode the media's codec.
    UnsupportedCodec,
    /// Any other transport-level send failure.
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_frames_carry_stable_tags() {
        let frame = GatewayFrame::CheckRegistered {
            request_id: "r1".into(),
            jid: "5551234567@c.us".into(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "check_registered");
        assert_eq!(json["jid"], "5551234567@c.us");
    }

    #[test]
    fn send_result_round_trips() {
        let json = serde_json::json!({
            "type": "send_result",
            "request_id": "r2",
            "success": false,
            "error": "cannot decode stream",
            "error_kind": "unsupported_codec",
        });
        let frame: SidecarFrame = serde_json::from_value(json).unwrap();
        match frame {
            SidecarFrame::SendResult {
                success,
                error_kind,
                message_id,
                ..
            } => {
                assert!(!success);
                assert_eq!(error_kind, Some(SendErrorKind::UnsupportedCodec));
                assert!(message_id.is_none());
            },
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn lifecycle_frames_parse_without_payload() {
        let frame: SidecarFrame = serde_json::from_str(r#"{"type":"ready"}"#).unwrap();
        assert!(matches!(frame, SidecarFrame::Ready));
    }

    #[test]
    fn login_omits_absent_auth_dir() {
        let json = serde_json::to_value(GatewayFrame::Login { auth_dir: None }).unwrap();
        assert!(json.get("auth_dir").is_none());
    }
}
