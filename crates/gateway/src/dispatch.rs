//! The dispatch pipeline: validate, normalize, check registration, resolve,
//! send, clean up.
//!
//! Staged uploads are released on every exit path: the happy and error
//! tails call [`MediaItem::discard`] explicitly, and any early return drops
//! the item's guard, which removes the file best-effort.

use {tracing::warn, url::Url};

use {
    wagate_media::{StagedUpload, fetch_remote, file_name_from_url},
    wagate_session::SessionController,
    wagate_transport::{OutgoingMedia, SendReceipt, TransportSession, normalize_jid},
};

use crate::error::DispatchError;

/// One media unit of a dispatch request.
#[derive(Debug)]
pub enum MediaItem {
    /// An uploaded file staged on disk.
    Staged(StagedUpload),
    /// A remote URL, fetched at resolution time.
    Remote { url: String },
}

impl MediaItem {
    /// Display label used in per-item results.
    pub fn label(&self) -> String {
        match self {
            Self::Staged(staged) => staged.original_name().to_string(),
            Self::Remote { url } => Url::parse(url)
                .map(|parsed| file_name_from_url(&parsed))
                .unwrap_or_else(|_| url.clone()),
        }
    }

    /// Resolve the item into transport-ready media.
    async fn resolve(&self, http: &reqwest::Client) -> Result<OutgoingMedia, DispatchError> {
        match self {
            Self::Staged(staged) => {
                let data = staged.read().await?;
                Ok(OutgoingMedia {
                    mime_type: staged.mime_type().to_string(),
                    file_name: staged.original_name().to_string(),
                    data: data.into(),
                })
            },
            Self::Remote { url } => {
                let fetched = fetch_remote(http, url).await?;
                Ok(OutgoingMedia {
                    mime_type: fetched.mime_type,
                    file_name: fetched.file_name,
                    data: fetched.data,
                })
            },
        }
    }

    /// Release any staged storage the item owns.
    async fn discard(self) {
        if let Self::Staged(staged) = self {
            staged.discard().await;
        }
    }
}

/// Outcome of one batch item, in input order.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Send a single media item.
pub async fn send_single(
    session: &SessionController,
    transport: &dyn TransportSession,
    http: &reqwest::Client,
    phone: Option<&str>,
    item: Option<MediaItem>,
    caption: &str,
) -> Result<SendReceipt, DispatchError> {
    if !session.status().ready {
        return Err(DispatchError::SessionNotReady);
    }
    let phone = phone
        .filter(|p| !p.is_empty())
        .ok_or(DispatchError::MissingAddress)?;
    let item = item.ok_or(DispatchError::MissingMedia)?;

    let jid = normalize_jid(phone);

    let result = async {
        if !transport
            .is_registered_user(&jid)
            .await
            .map_err(DispatchError::Send)?
        {
            return Err(DispatchError::RecipientNotRegistered);
        }
        send_item(transport, http, &jid, &item, caption).await
    }
    .await;

    item.discard().await;
    result
}

/// Send an ordered batch of media items.
///
/// Preconditions (readiness, address, registration) are checked once for the
/// whole batch; after that each item is attempted independently, in order,
/// and a failure never aborts the items after it.
pub async fn send_batch(
    session: &SessionController,
    transport: &dyn TransportSession,
    http: &reqwest::Client,
    phone: Option<&str>,
    items: Vec<MediaItem>,
    caption: &str,
) -> Result<Vec<ItemOutcome>, DispatchError> {
    if !session.status().ready {
        return Err(DispatchError::SessionNotReady);
    }
    let phone = phone
        .filter(|p| !p.is_empty())
        .ok_or(DispatchError::MissingAddress)?;
    if items.is_empty() {
        return Err(DispatchError::MissingMedia);
    }

    let jid = normalize_jid(phone);
    if !transport
        .is_registered_user(&jid)
        .await
        .map_err(DispatchError::Send)?
    {
        return Err(DispatchError::RecipientNotRegistered);
    }

    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        // The caption belongs to the outgoing batch message as a whole, so
        // only the first item carries it.
        let item_caption = if index == 0 { caption } else { "" };
        let label = item.label();

        let outcome = match send_item(transport, http, &jid, &item, item_caption).await {
            Ok(receipt) => ItemOutcome {
                file: label,
                message_id: Some(receipt.message_id),
                success: true,
                error: None,
            },
            Err(e) => {
                warn!(file = %label, error = %e, "batch item failed");
                ItemOutcome {
                    file: label,
                    message_id: None,
                    success: false,
                    error: Some(e.item_message()),
                }
            },
        };

        // Released as soon as this item's attempt resolves, not at batch end.
        item.discard().await;
        results.push(outcome);
    }

    Ok(results)
}

async fn send_item(
    transport: &dyn TransportSession,
    http: &reqwest::Client,
    jid: &str,
    item: &MediaItem,
    caption: &str,
) -> Result<SendReceipt, DispatchError> {
    let media = item.resolve(http).await?;
    transport
        .send_media(jid, media, caption)
        .await
        .map_err(DispatchError::Send)
}
