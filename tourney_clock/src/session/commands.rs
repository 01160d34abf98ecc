//! Operator commands and their outcomes.

use super::engine::TournamentState;
use crate::clock::ClockEvent;
use crate::roster::{BuyInType, Player, PlayerId};
use crate::structure::StructureUpdate;
use serde::{Deserialize, Serialize};

/// Every mutation a presentation adapter may request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    Start,
    Pause,
    Reset,
    Skip,
    ChangeStructure {
        structure_id: String,
    },
    AddPlayer {
        name: String,
        #[serde(default)]
        buy_in_type: BuyInType,
        #[serde(default)]
        paid_admin_fee: bool,
    },
    RemovePlayer {
        player_id: PlayerId,
    },
    EliminatePlayer {
        player_id: PlayerId,
    },
    RecordRebuy {
        player_id: PlayerId,
    },
    RecordAddon {
        player_id: PlayerId,
    },
    UpdateStructure {
        update: StructureUpdate,
    },
    ResetSession,
}

impl SessionCommand {
    /// Command name for logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Start => "start",
            SessionCommand::Pause => "pause",
            SessionCommand::Reset => "reset",
            SessionCommand::Skip => "skip",
            SessionCommand::ChangeStructure { .. } => "change_structure",
            SessionCommand::AddPlayer { .. } => "add_player",
            SessionCommand::RemovePlayer { .. } => "remove_player",
            SessionCommand::EliminatePlayer { .. } => "eliminate_player",
            SessionCommand::RecordRebuy { .. } => "record_rebuy",
            SessionCommand::RecordAddon { .. } => "record_addon",
            SessionCommand::UpdateStructure { .. } => "update_structure",
            SessionCommand::ResetSession => "reset_session",
        }
    }
}

/// Result of an accepted command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    /// Whether any state changed (no-ops are accepted but leave this false)
    pub changed: bool,
    /// Notifications to forward to the notifier
    pub events: Vec<ClockEvent>,
    /// The player the command created or modified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<Player>,
    /// Read model right after the command, filled in by
    /// [`TournamentSession::apply`](super::TournamentSession::apply)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TournamentState>,
}

impl CommandOutcome {
    pub(crate) fn unchanged() -> Self {
        Self::default()
    }

    pub(crate) fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_events(events: Vec<ClockEvent>) -> Self {
        Self {
            changed: true,
            events,
            ..Self::default()
        }
    }

    pub(crate) fn with_player(player: Player) -> Self {
        Self {
            changed: true,
            player: Some(player),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_deserializes_from_tagged_json() {
        let command: SessionCommand =
            serde_json::from_str(r#"{"type":"add_player","name":"Alice"}"#).unwrap();
        assert_eq!(
            command,
            SessionCommand::AddPlayer {
                name: "Alice".to_string(),
                buy_in_type: BuyInType::Normal,
                paid_admin_fee: false,
            }
        );

        let command: SessionCommand = serde_json::from_str(r#"{"type":"skip"}"#).unwrap();
        assert_eq!(command.name(), "skip");
    }

    #[test]
    fn test_double_buy_in_parses_lowercase() {
        let command: SessionCommand = serde_json::from_str(
            r#"{"type":"add_player","name":"Bob","buy_in_type":"double","paid_admin_fee":true}"#,
        )
        .unwrap();
        assert!(matches!(
            command,
            SessionCommand::AddPlayer {
                buy_in_type: BuyInType::Double,
                paid_admin_fee: true,
                ..
            }
        ));
    }
}
