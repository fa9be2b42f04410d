//! Router assembly and server lifecycle.

use std::{path::PathBuf, sync::Arc};

use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    tokio::net::TcpListener,
    tower_http::cors::{Any, CorsLayer},
    tracing::{error, info},
};

use {
    wagate_media::MAX_MEDIA_BYTES, wagate_session::SessionController,
    wagate_transport::TransportSession,
};

use crate::{extract::MAX_BATCH_ITEMS, routes};

/// Whole-body ceiling for upload requests: a full batch at the per-item
/// limit, plus multipart overhead.
const MAX_REQUEST_BYTES: usize =
    (MAX_MEDIA_BYTES as usize + 1024 * 1024) * MAX_BATCH_ITEMS;

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub session: SessionController,
    pub transport: Arc<dyn TransportSession>,
    pub http: reqwest::Client,
    pub staging_dir: PathBuf,
}

// ── Router assembly ──────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(routes::status))
        .route("/qr", get(routes::qr_code))
        .route("/send-media", post(routes::send_media))
        .route("/send-multiple-media", post(routes::send_multiple_media))
        .route("/send-media-url", post(routes::send_media_url))
        .route("/send-document", post(routes::send_document))
        .route(
            "/send-multiple-documents",
            post(routes::send_multiple_documents),
        )
        .route("/disconnect", post(routes::disconnect))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(cors)
        .with_state(state)
}

// ── Server lifecycle ─────────────────────────────────────────────────────────

/// Bind and serve until interrupted, then tear the transport down.
pub async fn run(bind: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("{bind}:{port}")).await?;
    run_until_shutdown(listener, state, shutdown_signal()).await
}

/// Serve on `listener` until `shutdown` resolves, then destroy the transport
/// session exactly once so no automation browser outlives the process.
pub async fn run_until_shutdown(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let transport = Arc::clone(&state.transport);
    let session = state.session.clone();
    let app = build_app(state);

    info!(addr = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("shutting down, destroying transport session");
    if let Err(e) = transport.destroy().await {
        error!(error = %e, "transport teardown failed");
        return Err(e.into());
    }
    session.mark_disconnected("process shutdown");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for interrupt signal");
    }
}
