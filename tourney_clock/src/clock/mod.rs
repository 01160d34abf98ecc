//! Tournament clock: the level countdown state machine.
//!
//! The clock moves through four phases:
//!
//! - **Idle**: at a level, not started since the last reset
//! - **Running**: counting down one second per tick
//! - **Paused**: frozen with the remaining time preserved
//! - **Finished**: the last level expired
//!
//! Ticks are driven from outside (see [`crate::session::SessionActor`]), so
//! the clock itself is a plain value that can be stepped in tests.
//!
//! ## Example
//!
//! ```
//! use tourney_clock::clock::{ClockEvent, TournamentClock};
//! use tourney_clock::structure::StructureCatalog;
//!
//! let catalog = StructureCatalog::builtin();
//! let mut clock = TournamentClock::new(catalog.default_structure());
//! clock.start().unwrap();
//!
//! let first = clock.time_remaining();
//! clock.tick();
//! assert_eq!(clock.time_remaining(), first - 1);
//!
//! assert_eq!(clock.skip(), Some(ClockEvent::LevelUp { level_index: 1 }));
//! ```

pub mod events;
pub mod timer;

pub use events::{
    CRITICAL_THRESHOLD_SECS, ClockEvent, TimeStatus, Tone, WARNING_THRESHOLD_SECS, format_time,
};
pub use timer::{ClockPhase, TimerState, TournamentClock};
