//! Error taxonomy for the tournament engine.

use crate::roster::PlayerId;
use thiserror::Error;

/// Rejected operator commands. Recovered locally and reported back with a
/// human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Player name must not be empty")]
    EmptyName,

    #[error("Player not found: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} is already eliminated")]
    AlreadyEliminated(PlayerId),

    #[error("Player {0} is eliminated and cannot buy more chips")]
    PlayerEliminated(PlayerId),

    #[error("Structure cannot be changed while the clock is running")]
    StructureLocked,

    #[error("Structure not found: {0}")]
    UnknownStructure(String),

    #[error("Duplicate structure id in catalog: {0}")]
    DuplicateStructure(String),

    #[error("Invalid amount for {field}: {value} (must be non-negative)")]
    NegativeAmount { field: &'static str, value: i64 },

    #[error("Invalid amount for {field}: {value} (must be at most {max})")]
    AmountTooLarge {
        field: &'static str,
        value: i64,
        max: i64,
    },

    #[error("Invalid blind level at index {index}: {reason}")]
    InvalidBlindLevel { index: usize, reason: String },

    #[error("Tournament clock has finished, reset it to start again")]
    ClockFinished,

    #[error("Rebuys are not allowed in this structure")]
    RebuyNotAllowed,

    #[error("Addons are not allowed in this structure")]
    AddonNotAllowed,
}

/// Structure problems that prevent the clock from running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Structure '{0}' has no blind levels")]
    NoLevels(String),

    #[error("Structure catalog is empty")]
    EmptyCatalog,
}

/// Snapshot storage failures. Never fatal: callers fall back to a fresh session.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Tournament session is closed")]
    Closed,
}

impl TournamentError {
    /// Get a message safe to show the operator.
    ///
    /// Persistence details stay in the logs; the operator only learns that
    /// saving or loading failed.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Persistence(_) => "Tournament state could not be saved".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the error is a rejected command rather than a system failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, TournamentError::Validation(_))
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
