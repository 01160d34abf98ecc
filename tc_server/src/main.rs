//! Tournament clock server using the async session actor.
//!
//! This server restores the last session snapshot, spawns the SessionActor
//! that drives the countdown, and serves the HTTP/WebSocket API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use tc_server::{api, config::ServerConfig, logging, metrics};
use tourney_clock::{JsonFileStore, SessionActor, SnapshotStore, StructureCatalog, load_session};

const HELP: &str = "\
Run a poker tournament clock server

USAGE:
  tc_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6970]
  --snapshot   PATH        Session snapshot file       [default: env SNAPSHOT_PATH or tournament_state.json]
  --structure  ID          Structure for a fresh session [default: env DEFAULT_STRUCTURE or regular]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  SNAPSHOT_PATH            Session snapshot file
  DEFAULT_STRUCTURE        Structure id for a fresh session (regular, turbo, deep-stack)
  TICK_INTERVAL_MS         Countdown tick interval in milliseconds [default: 1000]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  RUST_LOG                 Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let snapshot: Option<PathBuf> = pargs.opt_value_from_str("--snapshot")?;
    let structure: Option<String> = pargs.opt_value_from_str("--structure")?;

    logging::init();

    let catalog = Arc::new(StructureCatalog::builtin());
    let config = ServerConfig::from_env(bind, snapshot, structure)?;
    config.validate(&catalog)?;

    info!("Starting tournament clock server at {}", config.bind);

    // Restore the last session, or start fresh on the configured structure
    let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileStore::new(&config.snapshot_path));
    info!("Using snapshot file {}", config.snapshot_path.display());

    let session = load_session(
        store.as_ref(),
        catalog.clone(),
        config.fresh_structure(&catalog),
    );

    let state = session.state();
    info!(
        "Session ready: structure '{}', level index {}, {} of {} players remaining",
        state.structure.id, state.current_level, state.players_remaining, state.total_players
    );

    let handle = SessionActor::spawn(session, store, config.session_config());

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{}/metrics", metrics_bind);

        let session = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics::track_session(session).await {
                log::warn!("Metrics stopped following the session: {}", e);
            }
        });
    }

    let api_state = api::AppState {
        session: handle.clone(),
        catalog,
    };
    let app = api::create_router(api_state);

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    if let Err(e) = handle.shutdown().await {
        log::warn!("Session already stopped: {}", e);
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
