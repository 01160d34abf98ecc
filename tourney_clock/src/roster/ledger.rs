//! Player roster and derived tournament totals.

use super::models::{BuyInType, Player, PlayerId};
use crate::errors::{PersistenceError, ValidationError};
use crate::structure::TournamentStructure;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Aggregate figures derived from the roster and the active structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTotals {
    pub total_players: usize,
    pub players_remaining: usize,
    pub total_chips: i64,
    pub prize_pool: i64,
    /// Chips in play per remaining player
    pub average_stack: Option<i64>,
}

/// Owner of every [`Player`].
///
/// The ledger never looks at the clock; callers pass the level index when
/// recording an elimination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterLedger {
    players: Vec<Player>,
}

impl RosterLedger {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a roster from persisted players.
    ///
    /// Rejects duplicate ids, blank names, and elimination fields that
    /// disagree with the eliminated flag.
    pub fn from_players(players: Vec<Player>) -> Result<Self, PersistenceError> {
        let mut seen = HashSet::with_capacity(players.len());

        for player in &players {
            if !seen.insert(player.id) {
                return Err(PersistenceError::Invalid(format!(
                    "duplicate player id {}",
                    player.id
                )));
            }
            if player.name.trim().is_empty() {
                return Err(PersistenceError::Invalid(format!(
                    "player {} has an empty name",
                    player.id
                )));
            }
            if player.is_eliminated != player.position.is_some() {
                return Err(PersistenceError::Invalid(format!(
                    "player {} has inconsistent elimination state",
                    player.id
                )));
            }
        }

        Ok(Self { players })
    }

    /// Register a new active player.
    pub fn add_player(
        &mut self,
        name: &str,
        buy_in_type: BuyInType,
        paid_admin_fee: bool,
    ) -> Result<&Player, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        self.players
            .push(Player::register(name.to_string(), buy_in_type, paid_admin_fee));
        let player = &self.players[self.players.len() - 1];

        log::info!("Registered player {} '{}'", player.id, player.name);
        Ok(player)
    }

    /// Delete a player. Unknown ids are ignored.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(index);
        log::info!("Removed player {} '{}'", player.id, player.name);
        Some(player)
    }

    /// Record a player's elimination at `level_index`.
    ///
    /// The position is one more than the number of other players still
    /// active, so the first player out of N gets position N and the last
    /// one standing gets 1.
    pub fn eliminate_player(
        &mut self,
        id: PlayerId,
        level_index: usize,
    ) -> Result<&Player, ValidationError> {
        let index = self.index_of(id)?;
        if self.players[index].is_eliminated {
            return Err(ValidationError::AlreadyEliminated(id));
        }

        let others_active = self
            .players
            .iter()
            .filter(|p| p.is_active() && p.id != id)
            .count();
        let position = others_active as u32 + 1;

        let player = &mut self.players[index];
        player.is_eliminated = true;
        player.position = Some(position);
        player.elimination_level = Some(level_index);

        log::info!(
            "Player {} '{}' eliminated in position {} at level index {}",
            player.id,
            player.name,
            position,
            level_index
        );
        Ok(player)
    }

    /// Count one rebuy for an active player
    pub fn add_rebuy(&mut self, id: PlayerId) -> Result<&Player, ValidationError> {
        let player = self.active_mut(id)?;
        player.rebuys = player.rebuys.saturating_add(1);
        Ok(player)
    }

    /// Count one addon for an active player
    pub fn add_addon(&mut self, id: PlayerId) -> Result<&Player, ValidationError> {
        let player = self.active_mut(id)?;
        player.addons = player.addons.saturating_add(1);
        Ok(player)
    }

    fn index_of(&self, id: PlayerId) -> Result<usize, ValidationError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(ValidationError::UnknownPlayer(id))
    }

    fn active_mut(&mut self, id: PlayerId) -> Result<&mut Player, ValidationError> {
        let index = self.index_of(id)?;
        let player = &mut self.players[index];
        if player.is_eliminated {
            return Err(ValidationError::PlayerEliminated(id));
        }
        Ok(player)
    }

    /// Remove every player
    pub fn clear(&mut self) {
        self.players.clear();
    }

    /// Recompute totals for the given structure.
    ///
    /// Chips count every registration, eliminated or not. The guaranteed
    /// prize is a floor under the sum of buy-ins, never added to it. Sums
    /// saturate at `i64::MAX`.
    pub fn derive(&self, structure: &TournamentStructure) -> RosterTotals {
        let players_remaining = self.players.iter().filter(|p| p.is_active()).count();

        let total_chips = self
            .players
            .iter()
            .map(|p| {
                let admin_fee_chips = if p.paid_admin_fee {
                    structure.admin_fee_chips
                } else {
                    0
                };
                structure
                    .chips_for(p.buy_in_type)
                    .saturating_add(i64::from(p.addons).saturating_mul(structure.addon_chips))
                    .saturating_add(i64::from(p.rebuys).saturating_mul(structure.starting_chips))
                    .saturating_add(admin_fee_chips)
            })
            .fold(0i64, i64::saturating_add);

        let buy_ins = self
            .players
            .iter()
            .map(|p| structure.price_for(p.buy_in_type))
            .fold(0i64, i64::saturating_add);

        RosterTotals {
            total_players: self.players.len(),
            players_remaining,
            total_chips,
            prize_pool: buy_ins.max(structure.guaranteed_prize),
            average_stack: (players_remaining > 0)
                .then(|| total_chips / players_remaining as i64),
        }
    }

    /// All players in registration order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Get a player by id
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Players still in, in registration order
    pub fn active(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    /// Eliminated players in the order they went out
    pub fn eliminated(&self) -> Vec<&Player> {
        let mut out: Vec<&Player> = self.players.iter().filter(|p| p.is_eliminated).collect();
        out.sort_by(|a, b| b.position.cmp(&a.position));
        out
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::StructureCatalog;

    fn structure() -> TournamentStructure {
        let mut structure = StructureCatalog::builtin().default_structure().clone();
        structure.starting_chips = 10_000;
        structure.double_buy_in_chips = 20_000;
        structure.addon_chips = 5_000;
        structure.admin_fee_chips = 1_000;
        structure.buy_in = 100;
        structure.double_buy_in = 200;
        structure.guaranteed_prize = 1_000;
        structure
    }

    #[test]
    fn test_add_player_trims_name() {
        let mut roster = RosterLedger::new();
        let player = roster.add_player("  Alice ", BuyInType::Normal, false).unwrap();
        assert_eq!(player.name, "Alice");
        assert!(player.is_active());
        assert_eq!(player.chips, 0);
        assert_eq!(player.rebuys, 0);
        assert_eq!(player.addons, 0);
        assert_eq!(player.position, None);
    }

    #[test]
    fn test_add_player_rejects_blank_name() {
        let mut roster = RosterLedger::new();
        assert_eq!(
            roster.add_player("   ", BuyInType::Normal, false).unwrap_err(),
            ValidationError::EmptyName
        );
        assert!(roster.is_empty());
    }

    #[test]
    fn test_player_ids_are_unique() {
        let mut roster = RosterLedger::new();
        let a = roster.add_player("Same", BuyInType::Normal, false).unwrap().id;
        let b = roster.add_player("Same", BuyInType::Normal, false).unwrap().id;
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_unknown_player_is_noop() {
        let mut roster = RosterLedger::new();
        roster.add_player("Alice", BuyInType::Normal, false).unwrap();
        assert!(roster.remove_player(PlayerId::new_v4()).is_none());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_elimination_positions_count_down() {
        let mut roster = RosterLedger::new();
        let ids: Vec<PlayerId> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| roster.add_player(name, BuyInType::Normal, false).unwrap().id)
            .collect();
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);

        assert_eq!(roster.eliminate_player(b, 0).unwrap().position, Some(4));
        assert_eq!(roster.eliminate_player(d, 1).unwrap().position, Some(3));
        assert_eq!(roster.eliminate_player(a, 2).unwrap().position, Some(2));
        assert_eq!(roster.eliminate_player(c, 3).unwrap().position, Some(1));

        let order: Vec<PlayerId> = roster.eliminated().iter().map(|p| p.id).collect();
        assert_eq!(order, vec![b, d, a, c]);
        assert_eq!(roster.get(d).unwrap().elimination_level, Some(1));
    }

    #[test]
    fn test_double_elimination_is_rejected() {
        let mut roster = RosterLedger::new();
        let id = roster.add_player("Alice", BuyInType::Normal, false).unwrap().id;
        roster.add_player("Bob", BuyInType::Normal, false).unwrap();
        roster.eliminate_player(id, 3).unwrap();

        assert_eq!(
            roster.eliminate_player(id, 5).unwrap_err(),
            ValidationError::AlreadyEliminated(id)
        );
        let player = roster.get(id).unwrap();
        assert_eq!(player.position, Some(2));
        assert_eq!(player.elimination_level, Some(3));
    }

    #[test]
    fn test_eliminate_unknown_player() {
        let mut roster = RosterLedger::new();
        let id = PlayerId::new_v4();
        assert_eq!(
            roster.eliminate_player(id, 0).unwrap_err(),
            ValidationError::UnknownPlayer(id)
        );
    }

    #[test]
    fn test_rebuy_and_addon_counts() {
        let mut roster = RosterLedger::new();
        let id = roster.add_player("Alice", BuyInType::Normal, false).unwrap().id;
        roster.add_rebuy(id).unwrap();
        roster.add_addon(id).unwrap();
        roster.add_addon(id).unwrap();

        let player = roster.get(id).unwrap();
        assert_eq!(player.rebuys, 1);
        assert_eq!(player.addons, 2);

        let totals = roster.derive(&structure());
        assert_eq!(totals.total_chips, 10_000 + 10_000 + 2 * 5_000);
    }

    #[test]
    fn test_eliminated_player_cannot_rebuy() {
        let mut roster = RosterLedger::new();
        let id = roster.add_player("Alice", BuyInType::Normal, false).unwrap().id;
        roster.eliminate_player(id, 0).unwrap();
        assert_eq!(
            roster.add_rebuy(id).unwrap_err(),
            ValidationError::PlayerEliminated(id)
        );
        assert_eq!(
            roster.add_addon(id).unwrap_err(),
            ValidationError::PlayerEliminated(id)
        );
    }

    #[test]
    fn test_derive_totals() {
        let mut roster = RosterLedger::new();
        roster.add_player("P1", BuyInType::Normal, false).unwrap();
        let p2 = roster.add_player("P2", BuyInType::Double, true).unwrap().id;
        roster.add_addon(p2).unwrap();

        let totals = roster.derive(&structure());
        assert_eq!(totals.total_players, 2);
        assert_eq!(totals.players_remaining, 2);
        assert_eq!(totals.total_chips, 36_000);
        assert_eq!(totals.prize_pool, 1_000);
        assert_eq!(totals.average_stack, Some(18_000));
    }

    #[test]
    fn test_prize_pool_exceeds_guarantee() {
        let mut roster = RosterLedger::new();
        for i in 0..12 {
            roster
                .add_player(&format!("P{i}"), BuyInType::Normal, false)
                .unwrap();
        }
        assert_eq!(roster.derive(&structure()).prize_pool, 1_200);
    }

    #[test]
    fn test_derive_saturates_on_huge_amounts() {
        let mut structure = structure();
        structure.addon_chips = i64::MAX;
        structure.buy_in = i64::MAX;

        let mut roster = RosterLedger::new();
        let id = roster.add_player("Alice", BuyInType::Normal, false).unwrap().id;
        roster.add_player("Bob", BuyInType::Normal, false).unwrap();
        roster.add_addon(id).unwrap();

        let totals = roster.derive(&structure);
        assert_eq!(totals.total_chips, i64::MAX);
        assert_eq!(totals.prize_pool, i64::MAX);
        assert_eq!(totals.average_stack, Some(i64::MAX / 2));
    }

    #[test]
    fn test_empty_roster_totals() {
        let totals = RosterLedger::new().derive(&structure());
        assert_eq!(totals.total_players, 0);
        assert_eq!(totals.total_chips, 0);
        assert_eq!(totals.prize_pool, 1_000);
        assert_eq!(totals.average_stack, None);
    }

    #[test]
    fn test_from_players_rejects_duplicates() {
        let mut roster = RosterLedger::new();
        roster.add_player("Alice", BuyInType::Normal, false).unwrap();
        let mut players = roster.players().to_vec();
        players.push(players[0].clone());
        assert!(RosterLedger::from_players(players).is_err());
    }

    #[test]
    fn test_from_players_rejects_inconsistent_elimination() {
        let mut roster = RosterLedger::new();
        roster.add_player("Alice", BuyInType::Normal, false).unwrap();
        let mut players = roster.players().to_vec();
        players[0].is_eliminated = true;
        assert!(RosterLedger::from_players(players).is_err());
    }

    #[test]
    fn test_from_players_round_trip() {
        let mut roster = RosterLedger::new();
        roster.add_player("Alice", BuyInType::Double, true).unwrap();
        let bob = roster.add_player("Bob", BuyInType::Normal, false).unwrap().id;
        roster.eliminate_player(bob, 2).unwrap();

        let rebuilt = RosterLedger::from_players(roster.players().to_vec()).unwrap();
        assert_eq!(rebuilt, roster);
    }
}
