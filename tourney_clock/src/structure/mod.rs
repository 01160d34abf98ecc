//! Tournament structures: blind levels, breaks and buy-in parameters.
//!
//! A [`TournamentStructure`] is an immutable template selected from a
//! [`StructureCatalog`]. Sessions copy the selected template and may override
//! its monetary and chip fields through a [`StructureUpdate`]; the level
//! sequence itself is never edited.
//!
//! ## Example
//!
//! ```
//! use tourney_clock::structure::{StructureCatalog, StructureUpdate};
//!
//! let catalog = StructureCatalog::builtin();
//! let mut structure = catalog.default_structure().clone();
//!
//! structure
//!     .apply(&StructureUpdate {
//!         buy_in: Some(150),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! assert_eq!(structure.double_buy_in, 300);
//! ```

pub mod catalog;
pub mod models;

pub use catalog::StructureCatalog;
pub use models::{
    BlindLevel, DEFAULT_BREAK_MINUTES, MAX_AMOUNT, StructureUpdate, TournamentStructure,
};
