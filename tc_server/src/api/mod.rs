//! HTTP/WebSocket API for the tournament clock server.
//!
//! Presentation adapters (the operator console and the big-screen display)
//! drive the session through the REST commands and follow it through the
//! WebSocket feed. All state lives in the session actor; handlers only
//! translate requests into [`SessionCommand`](tourney_clock::SessionCommand)s.
//!
//! # Modules
//!
//! - [`tournament`]: Clock, structure and roster commands plus read endpoints
//! - [`websocket`]: Live display feed (state updates and clock events)
//!
//! # CORS
//!
//! CORS is configured permissively; the server is meant for a local network.

pub mod tournament;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, patch, post},
};
use serde_json::json;
use std::sync::Arc;
use tourney_clock::{SessionHandle, StructureCatalog};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// - `session`: Handle to the session actor
/// - `catalog`: Structure catalog the session selects from
#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    pub catalog: Arc<StructureCatalog>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET    /health                          - Health check
/// GET    /api/v1/state                    - Tournament read model with display helpers
/// GET    /api/v1/players[?status=...]     - Roster (all, active, eliminated)
/// POST   /api/v1/players                  - Register player
/// DELETE /api/v1/players/{id}             - Remove player
/// POST   /api/v1/players/{id}/eliminate   - Eliminate player
/// POST   /api/v1/players/{id}/rebuy       - Record rebuy
/// POST   /api/v1/players/{id}/addon       - Record addon
/// GET    /api/v1/structures               - Structure catalog
/// POST   /api/v1/structure/{id}           - Select structure
/// PATCH  /api/v1/structure                - Edit active structure fields
/// POST   /api/v1/clock/start              - Start or resume clock
/// POST   /api/v1/clock/pause              - Pause clock
/// POST   /api/v1/clock/reset              - Reset clock
/// POST   /api/v1/clock/skip               - Skip to next level
/// POST   /api/v1/session/reset            - Clear roster and reset clock
/// GET    /ws                              - WebSocket display feed
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router();

    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/state", get(tournament::get_state))
        .route("/structures", get(tournament::list_structures));

    let clock_routes = Router::new()
        .route("/clock/start", post(tournament::start_clock))
        .route("/clock/pause", post(tournament::pause_clock))
        .route("/clock/reset", post(tournament::reset_clock))
        .route("/clock/skip", post(tournament::skip_level));

    let structure_routes = Router::new()
        .route("/structure", patch(tournament::update_structure))
        .route("/structure/{structure_id}", post(tournament::change_structure));

    let player_routes = Router::new()
        .route(
            "/players",
            get(tournament::list_players).post(tournament::add_player),
        )
        .route("/players/{player_id}", delete(tournament::remove_player))
        .route(
            "/players/{player_id}/eliminate",
            post(tournament::eliminate_player),
        )
        .route("/players/{player_id}/rebuy", post(tournament::record_rebuy))
        .route("/players/{player_id}/addon", post(tournament::record_addon));

    Router::new()
        .merge(read_routes)
        .merge(clock_routes)
        .merge(structure_routes)
        .merge(player_routes)
        .route("/session/reset", post(tournament::reset_session))
}

/// Health check endpoint for monitoring.
///
/// Returns `200 OK` while the session actor answers, `503 Service Unavailable`
/// once it has stopped.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6970/health
/// # {"status":"healthy","version":"1.0.0","session":{"healthy":true,"running":false},...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let session_state = state.session.state().await.ok();
    let healthy = session_state.is_some();

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "session": {
            "healthy": healthy,
            "running": session_state.as_ref().is_some_and(|s| s.is_running),
            "structure": session_state.as_ref().map(|s| s.structure.id.clone()),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
