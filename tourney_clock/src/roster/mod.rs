//! Player roster: registration, elimination and derived totals.
//!
//! [`RosterLedger`] exclusively owns the players. Chip totals and the prize
//! pool are never stored; they are recomputed from the roster and the active
//! structure by [`RosterLedger::derive`].
//!
//! ## Example
//!
//! ```
//! use tourney_clock::roster::{BuyInType, RosterLedger};
//! use tourney_clock::structure::StructureCatalog;
//!
//! let catalog = StructureCatalog::builtin();
//! let structure = catalog.default_structure();
//!
//! let mut roster = RosterLedger::new();
//! let alice = roster.add_player("Alice", BuyInType::Normal, false).unwrap().id;
//! roster.add_player("Bob", BuyInType::Double, true).unwrap();
//!
//! // Alice goes out first of two: second place
//! assert_eq!(roster.eliminate_player(alice, 3).unwrap().position, Some(2));
//! assert_eq!(roster.derive(structure).players_remaining, 1);
//! ```

pub mod ledger;
pub mod models;

pub use ledger::{RosterLedger, RosterTotals};
pub use models::{BuyInType, Player, PlayerId};
