//! Tournament session: command gate, persistence and the actor that drives
//! the countdown.
//!
//! [`TournamentSession`] is the synchronous core. [`SessionActor`] wraps it in
//! a single-owner task, arms a one-second driver while the clock runs, saves
//! a [`Snapshot`] after every change and broadcasts
//! [`SessionNotification`]s to subscribers.
//!
//! ```
//! use std::sync::Arc;
//! use tourney_clock::roster::BuyInType;
//! use tourney_clock::session::{SessionCommand, TournamentSession};
//! use tourney_clock::structure::StructureCatalog;
//!
//! let mut session = TournamentSession::new(Arc::new(StructureCatalog::builtin()));
//! session
//!     .apply(SessionCommand::AddPlayer {
//!         name: "Alice".to_string(),
//!         buy_in_type: BuyInType::Normal,
//!         paid_admin_fee: false,
//!     })
//!     .unwrap();
//! session.apply(SessionCommand::Start).unwrap();
//! session.tick();
//!
//! let state = session.state();
//! assert!(state.is_running);
//! assert_eq!(state.time_remaining, 20 * 60 - 1);
//! assert_eq!(state.total_players, 1);
//! ```

pub mod actor;
pub mod commands;
pub mod config;
pub mod engine;
pub mod messages;
pub mod persistence;

pub use actor::{SessionActor, SessionHandle};
pub use commands::{CommandOutcome, SessionCommand};
pub use config::{DEFAULT_TICK_INTERVAL, SessionConfig};
pub use engine::{SessionView, Standings, TournamentSession, TournamentState};
pub use messages::{SessionMessage, SessionNotification};
pub use persistence::{
    JsonFileStore, MemoryStore, SNAPSHOT_VERSION, Snapshot, SnapshotStore, load_session,
};
