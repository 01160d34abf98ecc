//! Read-only catalog of structure templates.

use super::models::{BlindLevel, TournamentStructure};
use crate::errors::{ConfigurationError, TournamentResult, ValidationError};
use std::collections::HashSet;

/// Immutable set of structures, each keyed by a unique id.
///
/// The first entry is the default structure for fresh sessions.
#[derive(Debug, Clone)]
pub struct StructureCatalog {
    structures: Vec<TournamentStructure>,
}

impl StructureCatalog {
    /// Create a catalog from a list of structures.
    ///
    /// Ids must be unique and the list non-empty. Structures are not
    /// otherwise validated here: a structure without levels can be selected
    /// but the clock refuses to start it.
    pub fn new(structures: Vec<TournamentStructure>) -> TournamentResult<Self> {
        if structures.is_empty() {
            return Err(ConfigurationError::EmptyCatalog.into());
        }

        let mut seen = HashSet::new();
        for structure in &structures {
            if !seen.insert(structure.id.as_str()) {
                return Err(ValidationError::DuplicateStructure(structure.id.clone()).into());
            }
        }

        Ok(Self { structures })
    }

    /// The built-in structures
    pub fn builtin() -> Self {
        Self {
            structures: vec![regular(), turbo(), deep_stack()],
        }
    }

    /// Get a structure by id
    pub fn get(&self, id: &str) -> Option<&TournamentStructure> {
        self.structures.iter().find(|s| s.id == id)
    }

    /// Structure used for fresh sessions
    pub fn default_structure(&self) -> &TournamentStructure {
        &self.structures[0]
    }

    /// All structures in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &TournamentStructure> {
        self.structures.iter()
    }

    /// Number of structures
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Always false; a catalog holds at least one structure
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

impl Default for StructureCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Build a level list from `(small, big, ante)` triples of equal duration,
/// inserting a break after every `break_every` levels.
fn schedule(
    blinds: &[(i64, i64, i64)],
    minutes: u32,
    break_every: usize,
    break_minutes: u32,
) -> Vec<BlindLevel> {
    let mut levels = Vec::with_capacity(blinds.len() + blinds.len() / break_every);

    for (i, &(small, big, ante)) in blinds.iter().enumerate() {
        levels.push(BlindLevel::new(i as u32 + 1, small, big, minutes).with_ante(ante));

        let played = i + 1;
        if played % break_every == 0 && played < blinds.len() {
            levels.push(BlindLevel::pause_for(break_minutes));
        }
    }

    levels
}

fn regular() -> TournamentStructure {
    let blinds = [
        (25, 50, 0),
        (50, 100, 0),
        (75, 150, 0),
        (100, 200, 25),
        (150, 300, 25),
        (200, 400, 50),
        (300, 600, 75),
        (400, 800, 100),
        (500, 1_000, 100),
        (700, 1_400, 200),
        (1_000, 2_000, 300),
        (1_500, 3_000, 400),
    ];

    TournamentStructure {
        id: "regular".to_string(),
        name: "Regular".to_string(),
        description: "20 minute levels with a break every four levels".to_string(),
        blind_levels: schedule(&blinds, 20, 4, 15),
        starting_chips: 10_000,
        double_buy_in_chips: 20_000,
        addon_chips: 10_000,
        admin_fee_chips: 1_000,
        buy_in: 100,
        double_buy_in: 200,
        admin_fee: 20,
        addon: 50,
        guaranteed_prize: 1_000,
        rebuy_allowed: true,
        addon_allowed: true,
        break_duration: 15,
    }
}

fn turbo() -> TournamentStructure {
    let blinds = [
        (50, 100, 0),
        (100, 200, 0),
        (150, 300, 25),
        (200, 400, 50),
        (300, 600, 75),
        (500, 1_000, 100),
        (800, 1_600, 200),
        (1_200, 2_400, 300),
        (2_000, 4_000, 500),
        (3_000, 6_000, 1_000),
    ];

    TournamentStructure {
        id: "turbo".to_string(),
        name: "Turbo".to_string(),
        description: "10 minute levels, freezeout".to_string(),
        blind_levels: schedule(&blinds, 10, 5, 10),
        starting_chips: 5_000,
        double_buy_in_chips: 10_000,
        addon_chips: 0,
        admin_fee_chips: 500,
        buy_in: 50,
        double_buy_in: 100,
        admin_fee: 10,
        addon: 0,
        guaranteed_prize: 0,
        rebuy_allowed: false,
        addon_allowed: false,
        break_duration: 10,
    }
}

fn deep_stack() -> TournamentStructure {
    let blinds = [
        (50, 100, 0),
        (100, 200, 0),
        (100, 200, 25),
        (150, 300, 25),
        (200, 400, 50),
        (250, 500, 50),
        (300, 600, 75),
        (400, 800, 100),
        (500, 1_000, 100),
        (600, 1_200, 200),
        (800, 1_600, 200),
        (1_000, 2_000, 300),
        (1_500, 3_000, 400),
        (2_000, 4_000, 500),
    ];

    TournamentStructure {
        id: "deep-stack".to_string(),
        name: "Deep Stack".to_string(),
        description: "30 minute levels, 30k stacks, 20 minute breaks".to_string(),
        blind_levels: schedule(&blinds, 30, 4, 20),
        starting_chips: 30_000,
        double_buy_in_chips: 60_000,
        addon_chips: 20_000,
        admin_fee_chips: 5_000,
        buy_in: 200,
        double_buy_in: 400,
        admin_fee: 30,
        addon: 100,
        guaranteed_prize: 5_000,
        rebuy_allowed: true,
        addon_allowed: true,
        break_duration: 20,
    }
}
