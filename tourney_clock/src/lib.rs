//! # Tourney Clock
//!
//! Core of a live poker tournament clock: a blind-level countdown, a player
//! roster with elimination positions, and the derived totals shown on the
//! presentation screen.
//!
//! ## Core Modules
//!
//! - [`structure`]: Blind levels, tournament structures and the built-in catalog
//! - [`clock`]: Countdown state machine and its threshold events
//! - [`roster`]: Player registration, eliminations and derived totals
//! - [`session`]: Command gate, snapshot persistence and the session actor
//! - [`errors`]: Error taxonomy shared by all of the above
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tourney_clock::{BuyInType, StructureCatalog, TournamentSession};
//!
//! let mut session = TournamentSession::new(Arc::new(StructureCatalog::builtin()));
//! session.add_player("Alice", BuyInType::Normal, false).unwrap();
//! session.add_player("Bob", BuyInType::Double, true).unwrap();
//!
//! let state = session.state();
//! assert_eq!(state.total_players, 2);
//! assert_eq!(state.players_remaining, 2);
//! ```

/// Blind levels, structures and the structure catalog.
pub mod structure;
pub use structure::{
    BlindLevel, MAX_AMOUNT, StructureCatalog, StructureUpdate, TournamentStructure,
};

/// Countdown state machine.
pub mod clock;
pub use clock::{ClockEvent, ClockPhase, TimeStatus, Tone, TournamentClock, format_time};

/// Player roster.
pub mod roster;
pub use roster::{BuyInType, Player, PlayerId, RosterLedger, RosterTotals};

/// Session engine, persistence and actor.
pub mod session;
pub use session::{
    CommandOutcome, JsonFileStore, MemoryStore, SessionActor, SessionCommand, SessionConfig,
    SessionHandle, SessionNotification, SessionView, Snapshot, SnapshotStore, Standings,
    TournamentSession, TournamentState, load_session,
};

/// Error types.
pub mod errors;
pub use errors::{
    ConfigurationError, PersistenceError, TournamentError, TournamentResult, ValidationError,
};
