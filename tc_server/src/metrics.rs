//! Prometheus metrics for monitoring the tournament clock server.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener when
//! `METRICS_BIND` is set. Without an installed recorder every call is a no-op.
//!
//! # Metrics Categories
//!
//! - **Command Metrics**: Operator commands by name and outcome
//! - **Clock Metrics**: Clock events by kind, current level
//! - **Tournament Metrics**: Players remaining, prize pool, chips in play
//! - **WebSocket Metrics**: Active display connections
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tc_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::commands_total("start", "applied");
//! ```
//!
//! Clock and tournament metrics come from the session's notification feed
//! through [`track_session`], so ticks and WebSocket commands are covered.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tourney_clock::{
    ClockEvent, SessionHandle, SessionNotification, TournamentResult, TournamentState,
};

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// Command Metrics
// ============================================================================

/// Record an operator command.
pub fn commands_total(command: &str, outcome: &str) {
    metrics::counter!("commands_total",
        "command" => command.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record time spent waiting for the session actor in milliseconds.
pub fn command_duration_ms(command: &str, duration_ms: f64) {
    metrics::histogram!("command_duration_ms",
        "command" => command.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Clock Metrics
// ============================================================================

/// Increment the clock event counter.
pub fn clock_events_total(event: &ClockEvent) {
    metrics::counter!("clock_events_total",
        "kind" => event.kind()
    )
    .increment(1);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

/// Update the tournament gauges from a read model.
pub fn record_state(state: &TournamentState) {
    metrics::gauge!("current_level").set(state.current_level as f64);
    metrics::gauge!("players_remaining").set(state.players_remaining as f64);
    metrics::gauge!("players_total").set(state.total_players as f64);
    metrics::gauge!("prize_pool").set(state.prize_pool as f64);
    metrics::gauge!("total_chips").set(state.total_chips as f64);
}

/// Record one session notification.
pub fn record_notification(notification: &SessionNotification) {
    match notification {
        SessionNotification::Clock(event) => clock_events_total(event),
        SessionNotification::Updated(view) => record_state(&view.state),
    }
}

/// Subscribe to the session and record every notification until it stops.
pub async fn track_session(session: SessionHandle) -> TournamentResult<()> {
    let (subscriber_id, mut notifications) = session.subscribe().await?;
    log::debug!("Metrics subscribed to session as {}", subscriber_id);

    while let Some(notification) = notifications.recv().await {
        record_notification(&notification);
    }

    log::debug!("Metrics feed closed");
    Ok(())
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Adjust the active display connection gauge.
pub fn websocket_connections_active(delta: f64) {
    metrics::gauge!("websocket_connections_active").increment(delta);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}
