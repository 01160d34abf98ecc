//! Tournament command and read handlers.
//!
//! Every mutating endpoint forwards one command to the session actor and
//! answers with the command outcome plus the resulting read model.
//!
//! # Examples
//!
//! Register a player:
//! ```bash
//! curl -X POST http://localhost:6970/api/v1/players \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Alice", "buy_in_type": "double", "paid_admin_fee": true}'
//! ```
//!
//! Start the clock:
//! ```bash
//! curl -X POST http://localhost:6970/api/v1/clock/start
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tourney_clock::{
    BuyInType, ClockEvent, Player, PlayerId, SessionCommand, SessionView, StructureUpdate,
    TournamentError, TournamentState, TournamentStructure, ValidationError,
};

use super::AppState;
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct PlayerListQuery {
    #[serde(default)]
    pub status: PlayerStatus,
}

/// Which players to list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Everyone, in registration order
    #[default]
    All,
    /// Players still in, in registration order
    Active,
    /// Eliminated players in the order they went out
    Eliminated,
}

#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
    #[serde(default)]
    pub buy_in_type: BuyInType,
    #[serde(default)]
    pub paid_admin_fee: bool,
}

/// Outcome of a command plus the state it left behind
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub changed: bool,
    pub events: Vec<ClockEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<Player>,
    pub state: TournamentState,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for a session error.
///
/// Unknown ids are 404, a locked structure or an unplayable one 409, other
/// rejected commands 422, a stopped session 503.
pub fn status_for(error: &TournamentError) -> StatusCode {
    match error {
        TournamentError::Validation(
            ValidationError::UnknownPlayer(_) | ValidationError::UnknownStructure(_),
        ) => StatusCode::NOT_FOUND,
        TournamentError::Validation(ValidationError::StructureLocked) => StatusCode::CONFLICT,
        TournamentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TournamentError::Configuration(_) => StatusCode::CONFLICT,
        TournamentError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        TournamentError::Closed => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn error_response(error: TournamentError) -> ApiError {
    if matches!(error, TournamentError::Persistence(_)) {
        log::error!("Session persistence error: {}", error);
    }
    (
        status_for(&error),
        Json(ErrorResponse {
            error: error.client_message(),
        }),
    )
}

/// Forward a command to the session and build the response
async fn run_command(
    state: &AppState,
    command: SessionCommand,
) -> Result<Json<CommandResponse>, ApiError> {
    let name = command.name();
    let started = Instant::now();
    let result = state.session.command(command).await;
    let elapsed = started.elapsed();

    let outcome_label = match &result {
        Ok(outcome) if outcome.changed => "applied",
        Ok(_) => "unchanged",
        Err(_) => "rejected",
    };
    logging::log_command(name, outcome_label, elapsed.as_millis() as u64);
    metrics::commands_total(name, outcome_label);
    metrics::command_duration_ms(name, elapsed.as_secs_f64() * 1000.0);

    let mut outcome = result.map_err(error_response)?;
    let tournament = match outcome.state.take() {
        Some(tournament) => tournament,
        None => state.session.state().await.map_err(error_response)?,
    };

    Ok(Json(CommandResponse {
        changed: outcome.changed,
        events: outcome.events,
        player: outcome.player,
        state: tournament,
    }))
}

/// Get the tournament read model with display helpers.
///
/// # Response
///
/// Returns `200 OK` with the state, e.g.:
/// ```json
/// {
///   "is_running": true,
///   "is_paused": false,
///   "current_level": 2,
///   "time_remaining": 845,
///   "total_players": 24,
///   "players_remaining": 17,
///   "prize_pool": 2400,
///   "total_chips": 265000,
///   "structure": { "id": "regular", ... },
///   "phase": "running",
///   "time_status": "normal",
///   "clock_display": "14:05",
///   "level_progress": 29.58,
///   "average_stack": 15588,
///   "current_blind": { "level": 3, "small_blind": 100, "big_blind": 200, ... },
///   "next_blind": { "level": 4, ... }
/// }
/// ```
pub async fn get_state(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    state
        .session
        .view()
        .await
        .map(Json)
        .map_err(error_response)
}

/// List players.
///
/// `?status=active` lists players still in and `?status=eliminated` lists
/// eliminations in the order they happened. Without a filter every player
/// is listed in registration order.
pub async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<PlayerListQuery>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let players = match query.status {
        PlayerStatus::All => state.session.players().await,
        PlayerStatus::Active => state.session.standings().await.map(|s| s.active),
        PlayerStatus::Eliminated => state.session.standings().await.map(|s| s.eliminated),
    };
    players.map(Json).map_err(error_response)
}

/// List the structure catalog.
pub async fn list_structures(State(state): State<AppState>) -> Json<Vec<TournamentStructure>> {
    Json(state.catalog.iter().cloned().collect())
}

/// Start or resume the clock.
///
/// # Errors
///
/// - `409 Conflict`: Structure has no levels
/// - `422 Unprocessable Entity`: Clock has finished and must be reset
pub async fn start_clock(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::Start).await
}

/// Pause the clock. A no-op unless running.
pub async fn pause_clock(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::Pause).await
}

/// Return the clock to the first level, stopped.
pub async fn reset_clock(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::Reset).await
}

/// Jump to the next level.
pub async fn skip_level(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::Skip).await
}

/// Select a structure from the catalog.
///
/// # Errors
///
/// - `404 Not Found`: Unknown structure id
/// - `409 Conflict`: Clock is running
pub async fn change_structure(
    State(state): State<AppState>,
    Path(structure_id): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::ChangeStructure { structure_id }).await
}

/// Edit metadata, chip and price fields of the active structure.
///
/// # Request Body
///
/// Any subset of the editable fields:
/// ```json
/// { "starting_chips": 15000, "buy_in": 150, "rebuy_allowed": false }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Clock is running
/// - `422 Unprocessable Entity`: Negative amount
pub async fn update_structure(
    State(state): State<AppState>,
    Json(update): Json<StructureUpdate>,
) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::UpdateStructure { update }).await
}

/// Register a player.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Blank name
pub async fn add_player(
    State(state): State<AppState>,
    Json(request): Json<AddPlayerRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let response = run_command(
        &state,
        SessionCommand::AddPlayer {
            name: request.name,
            buy_in_type: request.buy_in_type,
            paid_admin_fee: request.paid_admin_fee,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, response))
}

/// Remove a player. Unknown ids succeed with `changed: false`.
pub async fn remove_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::RemovePlayer { player_id }).await
}

/// Eliminate a player at the current level.
///
/// # Errors
///
/// - `404 Not Found`: Unknown player
/// - `422 Unprocessable Entity`: Player already eliminated
pub async fn eliminate_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::EliminatePlayer { player_id }).await
}

/// Record a rebuy.
pub async fn record_rebuy(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::RecordRebuy { player_id }).await
}

/// Record an addon.
pub async fn record_addon(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::RecordAddon { player_id }).await
}

/// Clear the roster and reset the clock, keeping the structure.
pub async fn reset_session(
    State(state): State<AppState>,
) -> Result<Json<CommandResponse>, ApiError> {
    run_command(&state, SessionCommand::ResetSession).await
}
