//! HTTP route handlers.

use {
    axum::{
        Json,
        extract::{Multipart, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde::Deserialize,
    serde_json::json,
    tracing::error,
};

use crate::{
    dispatch::{self, MediaItem},
    error::DispatchError,
    extract::{MAX_BATCH_ITEMS, read_upload_form},
    qr,
    server::AppState,
};

/// `GET /status`
pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.session.status();
    Json(json!({ "isReady": snapshot.ready, "hasQR": snapshot.has_qr }))
}

/// `GET /qr`
pub async fn qr_code(State(state): State<AppState>) -> Response {
    if let Some(payload) = state.session.qr_code() {
        return match qr::qr_data_uri(&payload) {
            Ok(data_uri) => Json(json!({ "qrCode": data_uri })).into_response(),
            Err(e) => {
                error!(error = %e, "failed to render pairing challenge");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "error rendering QR code" })),
                )
                    .into_response()
            },
        };
    }

    if state.session.status().ready {
        return Json(json!({ "message": "client already authenticated" })).into_response();
    }

    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "QR code not available" })),
    )
        .into_response()
}

/// `POST /send-media` — one uploaded file.
pub async fn send_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, DispatchError> {
    let form = read_upload_form(multipart, "media", &state.staging_dir, 1).await?;
    let item = form.files.into_iter().next().map(MediaItem::Staged);

    let receipt = dispatch::send_single(
        &state.session,
        state.transport.as_ref(),
        &state.http,
        form.phone.as_deref(),
        item,
        form.caption.as_deref().unwrap_or(""),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "messageId": receipt.message_id,
        "message": "Media sent successfully",
    })))
}

/// `POST /send-multiple-media` — up to 10 uploaded files.
pub async fn send_multiple_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, DispatchError> {
    let form = read_upload_form(multipart, "media", &state.staging_dir, MAX_BATCH_ITEMS).await?;
    let items = form.files.into_iter().map(MediaItem::Staged).collect();

    let results = dispatch::send_batch(
        &state.session,
        state.transport.as_ref(),
        &state.http,
        form.phone.as_deref(),
        items,
        form.caption.as_deref().unwrap_or(""),
    )
    .await?;

    Ok(Json(json!({ "success": true, "results": results })))
}

#[derive(Debug, Deserialize)]
pub struct SendUrlRequest {
    pub phone: Option<String>,
    pub url: Option<String>,
    pub caption: Option<String>,
}

/// `POST /send-media-url` — media fetched from a remote URL.
pub async fn send_media_url(
    State(state): State<AppState>,
    Json(body): Json<SendUrlRequest>,
) -> Result<Json<serde_json::Value>, DispatchError> {
    let item = body
        .url
        .filter(|url| !url.is_empty())
        .map(|url| MediaItem::Remote { url });

    let receipt = dispatch::send_single(
        &state.session,
        state.transport.as_ref(),
        &state.http,
        body.phone.as_deref(),
        item,
        body.caption.as_deref().unwrap_or(""),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "messageId": receipt.message_id,
        "message": "Media sent successfully via URL",
    })))
}

/// `POST /send-document` — one uploaded document.
pub async fn send_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, DispatchError> {
    let form = read_upload_form(multipart, "document", &state.staging_dir, 1).await?;
    require_documents(&form.files)?;
    let file_name = form.files.first().map(|f| f.original_name().to_string());
    let item = form.files.into_iter().next().map(MediaItem::Staged);

    let receipt = dispatch::send_single(
        &state.session,
        state.transport.as_ref(),
        &state.http,
        form.phone.as_deref(),
        item,
        form.caption.as_deref().unwrap_or(""),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "messageId": receipt.message_id,
        "message": "Document sent successfully",
        "fileName": file_name,
    })))
}

/// `POST /send-multiple-documents` — up to 10 uploaded documents.
pub async fn send_multiple_documents(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, DispatchError> {
    let form = read_upload_form(multipart, "documents", &state.staging_dir, MAX_BATCH_ITEMS).await?;
    require_documents(&form.files)?;
    let items = form.files.into_iter().map(MediaItem::Staged).collect();

    let results = dispatch::send_batch(
        &state.session,
        state.transport.as_ref(),
        &state.http,
        form.phone.as_deref(),
        items,
        form.caption.as_deref().unwrap_or(""),
    )
    .await?;

    Ok(Json(json!({ "success": true, "results": results })))
}

/// `POST /disconnect` — tear the transport session down.
pub async fn disconnect(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, DispatchError> {
    state
        .transport
        .destroy()
        .await
        .map_err(DispatchError::Teardown)?;
    state.session.mark_disconnected("client destroyed");
    Ok(Json(json!({ "message": "Client disconnected successfully" })))
}

/// Document endpoints reject the whole request up front when any item's
/// declared content type is not `application/*`.
fn require_documents(files: &[wagate_media::StagedUpload]) -> Result<(), DispatchError> {
    for file in files {
        if !file.mime_type().starts_with("application/") {
            return Err(DispatchError::NotADocument {
                mime_type: file.mime_type().to_string(),
            });
        }
    }
    Ok(())
}
