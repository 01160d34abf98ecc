//! Structured logging configuration.
//!
//! The core library logs through the `log` facade; those records are bridged
//! into the tracing subscriber installed here.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the RUST_LOG env var (default `info`).
///
/// # Example
///
/// ```no_run
/// use tc_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log an operator command with structured data
///
/// # Arguments
///
/// * `command` - Command name
/// * `outcome` - `applied`, `unchanged` or `rejected`
/// * `duration_ms` - Time spent waiting for the session actor
///
/// # Example
///
/// ```
/// use tc_server::logging::log_command;
///
/// log_command("start", "applied", 2);
/// ```
pub fn log_command(command: &str, outcome: &str, duration_ms: u64) {
    if outcome == "rejected" {
        tracing::warn!(
            command = command,
            outcome = outcome,
            duration_ms = duration_ms,
            "Command rejected"
        );
    } else {
        tracing::info!(
            command = command,
            outcome = outcome,
            duration_ms = duration_ms,
            "Command completed"
        );
    }
}

/// Log a display connection change
pub fn log_display_connection(subscriber_id: &str, connected: bool) {
    tracing::info!(
        subscriber_id = subscriber_id,
        connected = connected,
        "Display {}",
        if connected { "connected" } else { "disconnected" }
    );
}
