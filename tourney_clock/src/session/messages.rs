//! Session actor message types.

use super::commands::{CommandOutcome, SessionCommand};
use super::engine::{SessionView, Standings, TournamentState};
use crate::clock::ClockEvent;
use crate::errors::TournamentResult;
use crate::roster::Player;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Operator command
    Command {
        command: SessionCommand,
        response: oneshot::Sender<TournamentResult<CommandOutcome>>,
    },

    /// Get the read model
    GetState {
        response: oneshot::Sender<TournamentState>,
    },

    /// Get the read model with display helpers
    GetView {
        response: oneshot::Sender<SessionView>,
    },

    /// Get the roster
    GetPlayers {
        response: oneshot::Sender<Vec<Player>>,
    },

    /// Get active and eliminated players in listing order
    GetStandings {
        response: oneshot::Sender<Standings>,
    },

    /// One countdown second elapsed (sent by the countdown driver)
    Tick { generation: u64 },

    /// Receive notifications after every change
    Subscribe {
        subscriber_id: Uuid,
        sender: mpsc::Sender<SessionNotification>,
    },

    /// Stop receiving notifications
    Unsubscribe { subscriber_id: Uuid },

    /// Stop the actor
    Shutdown,
}

/// Notification pushed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SessionNotification {
    /// Session state after a change
    Updated(SessionView),
    /// Clock event for the audible notifier
    Clock(ClockEvent),
}
