use std::{path::PathBuf, sync::Arc};

use {
    clap::Parser,
    tokio::sync::mpsc,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    wagate_config::GatewayConfig,
    wagate_gateway::server::{self, AppState},
    wagate_session::SessionController,
    wagate_transport::{BridgeOptions, SidecarTransport, TransportSession},
};

#[derive(Parser)]
#[command(name = "wagate", about = "wagate — WhatsApp media gateway")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides WAGATE_BIND).
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Upload staging directory (overrides UPLOAD_PATH).
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Sidecar directory (overrides WAGATE_SIDECAR_DIR).
    #[arg(long)]
    sidecar_dir: Option<PathBuf>,

    /// Attach to an already-running sidecar instead of spawning one.
    #[arg(long, default_value_t = false)]
    no_spawn_sidecar: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Deployments traditionally keep their settings in config.env.
    dotenvy::from_filename("config.env").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_telemetry(&cli);
    info!(version = env!("CARGO_PKG_VERSION"), "wagate starting");

    let mut config = GatewayConfig::from_env();
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = cli.upload_dir {
        config.upload_dir = dir;
    }
    if let Some(dir) = cli.sidecar_dir {
        config.sidecar.dir = Some(dir);
    }

    // The controller's event loop is the sole consumer of transport events.
    let (events_tx, events_rx) = mpsc::channel(64);
    let session = SessionController::new();
    tokio::spawn(session.clone().run(events_rx));

    let transport = SidecarTransport::start(
        BridgeOptions {
            sidecar_dir: config.sidecar.dir.clone(),
            port: config.sidecar.port,
            auth_dir: config.sidecar.auth_dir.clone(),
            auto_start: !cli.no_spawn_sidecar,
        },
        events_tx,
    )
    .await?;

    let state = AppState {
        session,
        transport: Arc::new(transport) as Arc<dyn TransportSession>,
        http: reqwest::Client::new(),
        staging_dir: config.upload_dir.clone(),
    };

    server::run(&config.bind, config.port, state).await
}
