//! Session composition: structure + clock + roster behind one command gate.

use super::commands::{CommandOutcome, SessionCommand};
use super::persistence::{SNAPSHOT_VERSION, Snapshot};
use crate::clock::{ClockEvent, ClockPhase, TimeStatus, TournamentClock, format_time};
use crate::errors::{PersistenceError, TournamentResult, ValidationError};
use crate::roster::{BuyInType, Player, PlayerId, RosterLedger};
use crate::structure::{BlindLevel, StructureCatalog, StructureUpdate, TournamentStructure};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Read model shared with adapters, recomputed on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentState {
    pub is_running: bool,
    pub is_paused: bool,
    pub current_level: usize,
    pub time_remaining: u32,
    pub total_players: usize,
    pub players_remaining: usize,
    pub prize_pool: i64,
    pub total_chips: i64,
    pub structure: TournamentStructure,
}

/// [`TournamentState`] plus display helpers for the presentation screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub state: TournamentState,
    pub phase: ClockPhase,
    pub time_status: TimeStatus,
    /// Remaining time as `MM:SS`
    pub clock_display: String,
    pub level_progress: f64,
    pub average_stack: Option<i64>,
    pub current_blind: Option<BlindLevel>,
    pub next_blind: Option<BlindLevel>,
}

/// Roster split for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standings {
    /// Players still in, in registration order
    pub active: Vec<Player>,
    /// Eliminated players in the order they went out
    pub eliminated: Vec<Player>,
}

/// One tournament: the selected structure, its clock and the roster.
///
/// All mutations go through [`apply`](TournamentSession::apply) or the
/// matching named methods, which return the events the clock produced.
/// Nothing here touches storage or timers.
#[derive(Debug, Clone)]
pub struct TournamentSession {
    catalog: Arc<StructureCatalog>,
    structure: TournamentStructure,
    clock: TournamentClock,
    roster: RosterLedger,
}

impl TournamentSession {
    /// Fresh idle session on the catalog's default structure
    pub fn new(catalog: Arc<StructureCatalog>) -> Self {
        let structure = catalog.default_structure().clone();
        Self::with_structure(catalog, structure)
    }

    /// Fresh idle session on the given structure
    pub fn with_structure(catalog: Arc<StructureCatalog>, structure: TournamentStructure) -> Self {
        let clock = TournamentClock::new(&structure);
        Self {
            catalog,
            structure,
            clock,
            roster: RosterLedger::new(),
        }
    }

    /// Rebuild a session from a snapshot.
    ///
    /// A clock saved while running is restored paused.
    pub fn restore(
        catalog: Arc<StructureCatalog>,
        snapshot: Snapshot,
    ) -> Result<Self, PersistenceError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let structure = snapshot.tournament.structure;
        structure
            .validate()
            .map_err(|e| PersistenceError::Invalid(format!("structure '{}': {e}", structure.id)))?;

        let roster = RosterLedger::from_players(snapshot.players)?;
        let clock = TournamentClock::restore(&structure, snapshot.timer_state)?;

        if snapshot.timer_state.is_running {
            log::warn!(
                "Snapshot from {} had a running clock, restored paused at level index {} with {}s left",
                snapshot.saved_at,
                clock.current_level(),
                clock.time_remaining()
            );
        }

        Ok(Self {
            catalog,
            structure,
            clock,
            roster,
        })
    }

    /// Dispatch a command.
    ///
    /// The outcome carries the read model the command left behind.
    pub fn apply(&mut self, command: SessionCommand) -> TournamentResult<CommandOutcome> {
        let mut outcome = self.dispatch(command)?;
        outcome.state = Some(self.state());
        Ok(outcome)
    }

    fn dispatch(&mut self, command: SessionCommand) -> TournamentResult<CommandOutcome> {
        match command {
            SessionCommand::Start => self.start(),
            SessionCommand::Pause => Ok(self.pause()),
            SessionCommand::Reset => Ok(self.reset()),
            SessionCommand::Skip => Ok(self.skip()),
            SessionCommand::ChangeStructure { structure_id } => {
                self.change_structure(&structure_id)
            }
            SessionCommand::AddPlayer {
                name,
                buy_in_type,
                paid_admin_fee,
            } => self.add_player(&name, buy_in_type, paid_admin_fee),
            SessionCommand::RemovePlayer { player_id } => Ok(self.remove_player(player_id)),
            SessionCommand::EliminatePlayer { player_id } => self.eliminate_player(player_id),
            SessionCommand::RecordRebuy { player_id } => self.record_rebuy(player_id),
            SessionCommand::RecordAddon { player_id } => self.record_addon(player_id),
            SessionCommand::UpdateStructure { update } => self.update_structure(&update),
            SessionCommand::ResetSession => Ok(self.reset_session()),
        }
    }

    pub fn start(&mut self) -> TournamentResult<CommandOutcome> {
        if self.clock.start()? {
            Ok(CommandOutcome::changed())
        } else {
            Ok(CommandOutcome::unchanged())
        }
    }

    pub fn pause(&mut self) -> CommandOutcome {
        if self.clock.pause() {
            CommandOutcome::changed()
        } else {
            CommandOutcome::unchanged()
        }
    }

    pub fn reset(&mut self) -> CommandOutcome {
        self.clock.reset();
        CommandOutcome::changed()
    }

    pub fn skip(&mut self) -> CommandOutcome {
        match self.clock.skip() {
            Some(event) => CommandOutcome::with_events(vec![event]),
            None => CommandOutcome::unchanged(),
        }
    }

    /// Advance the clock by one second
    pub fn tick(&mut self) -> Vec<ClockEvent> {
        self.clock.tick()
    }

    /// Select another catalog structure and go idle on it.
    ///
    /// Rejected while the clock is running. Session-level overrides of the
    /// previous structure are discarded.
    pub fn change_structure(&mut self, structure_id: &str) -> TournamentResult<CommandOutcome> {
        if self.clock.is_running() {
            return Err(ValidationError::StructureLocked.into());
        }

        let structure = self
            .catalog
            .get(structure_id)
            .ok_or_else(|| ValidationError::UnknownStructure(structure_id.to_string()))?
            .clone();

        log::info!("Structure changed to '{}'", structure.id);
        self.clock.change_structure(&structure);
        self.structure = structure;
        Ok(CommandOutcome::changed())
    }

    /// Merge edits into the active structure and go idle on it.
    ///
    /// Rejected while the clock is running.
    pub fn update_structure(&mut self, update: &StructureUpdate) -> TournamentResult<CommandOutcome> {
        if self.clock.is_running() {
            return Err(ValidationError::StructureLocked.into());
        }
        if update.is_empty() {
            return Ok(CommandOutcome::unchanged());
        }

        self.structure.apply(update)?;
        self.clock.change_structure(&self.structure);
        log::info!("Structure '{}' fields updated", self.structure.id);
        Ok(CommandOutcome::changed())
    }

    pub fn add_player(
        &mut self,
        name: &str,
        buy_in_type: BuyInType,
        paid_admin_fee: bool,
    ) -> TournamentResult<CommandOutcome> {
        let player = self.roster.add_player(name, buy_in_type, paid_admin_fee)?;
        Ok(CommandOutcome::with_player(player.clone()))
    }

    /// Delete a player. Unknown ids are accepted as a no-op.
    pub fn remove_player(&mut self, id: PlayerId) -> CommandOutcome {
        match self.roster.remove_player(id) {
            Some(player) => CommandOutcome::with_player(player),
            None => CommandOutcome::unchanged(),
        }
    }

    /// Eliminate a player at the clock's current level
    pub fn eliminate_player(&mut self, id: PlayerId) -> TournamentResult<CommandOutcome> {
        let level_index = self.clock.current_level();
        let player = self.roster.eliminate_player(id, level_index)?;
        Ok(CommandOutcome::with_player(player.clone()))
    }

    pub fn record_rebuy(&mut self, id: PlayerId) -> TournamentResult<CommandOutcome> {
        if !self.structure.rebuy_allowed {
            return Err(ValidationError::RebuyNotAllowed.into());
        }
        let player = self.roster.add_rebuy(id)?;
        Ok(CommandOutcome::with_player(player.clone()))
    }

    pub fn record_addon(&mut self, id: PlayerId) -> TournamentResult<CommandOutcome> {
        if !self.structure.addon_allowed {
            return Err(ValidationError::AddonNotAllowed.into());
        }
        let player = self.roster.add_addon(id)?;
        Ok(CommandOutcome::with_player(player.clone()))
    }

    /// Clear the roster and reset the clock, keeping the structure
    pub fn reset_session(&mut self) -> CommandOutcome {
        self.roster.clear();
        self.clock.reset();
        log::info!("Session reset on structure '{}'", self.structure.id);
        CommandOutcome::changed()
    }

    /// Current read model
    pub fn state(&self) -> TournamentState {
        let totals = self.roster.derive(&self.structure);
        TournamentState {
            is_running: self.clock.is_running(),
            is_paused: self.clock.is_paused(),
            current_level: self.clock.current_level(),
            time_remaining: self.clock.time_remaining(),
            total_players: totals.total_players,
            players_remaining: totals.players_remaining,
            prize_pool: totals.prize_pool,
            total_chips: totals.total_chips,
            structure: self.structure.clone(),
        }
    }

    /// Read model with display helpers
    pub fn view(&self) -> SessionView {
        let totals = self.roster.derive(&self.structure);
        SessionView {
            state: self.state(),
            phase: self.clock.phase(),
            time_status: self.clock.time_status(),
            clock_display: format_time(self.clock.time_remaining()),
            level_progress: self.clock.level_progress(),
            average_stack: totals.average_stack,
            current_blind: self.clock.current_blind().cloned(),
            next_blind: self.clock.next_blind().cloned(),
        }
    }

    /// Active and eliminated players in listing order
    pub fn standings(&self) -> Standings {
        Standings {
            active: self.roster.active().cloned().collect(),
            eliminated: self.roster.eliminated().into_iter().cloned().collect(),
        }
    }

    /// Everything needed to restore this session later
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            tournament: self.state(),
            players: self.roster.players().to_vec(),
            timer_state: self.clock.timer_state(),
        }
    }

    pub fn structure(&self) -> &TournamentStructure {
        &self.structure
    }

    pub fn clock(&self) -> &TournamentClock {
        &self.clock
    }

    pub fn roster(&self) -> &RosterLedger {
        &self.roster
    }

    pub fn players(&self) -> &[Player] {
        self.roster.players()
    }

    pub fn catalog(&self) -> &Arc<StructureCatalog> {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ConfigurationError, TournamentError};

    fn session() -> TournamentSession {
        TournamentSession::new(Arc::new(StructureCatalog::builtin()))
    }

    fn add(session: &mut TournamentSession, name: &str) -> PlayerId {
        session
            .add_player(name, BuyInType::Normal, false)
            .unwrap()
            .player
            .unwrap()
            .id
    }

    #[test]
    fn test_new_session_is_idle_on_default_structure() {
        let session = session();
        let state = session.state();
        assert_eq!(state.structure.id, "regular");
        assert!(!state.is_running && !state.is_paused);
        assert_eq!(state.current_level, 0);
        assert_eq!(state.time_remaining, 1200);
        assert_eq!(state.total_players, 0);
        assert_eq!(state.prize_pool, state.structure.guaranteed_prize);
    }

    #[test]
    fn test_start_twice_reports_no_change() {
        let mut session = session();
        assert!(session.apply(SessionCommand::Start).unwrap().changed);
        assert!(!session.apply(SessionCommand::Start).unwrap().changed);
        assert!(session.state().is_running);
    }

    #[test]
    fn test_change_structure_rejected_while_running() {
        let mut session = session();
        session.start().unwrap();
        let err = session.change_structure("turbo").unwrap_err();
        assert!(matches!(
            err,
            TournamentError::Validation(ValidationError::StructureLocked)
        ));
        assert_eq!(session.structure().id, "regular");
    }

    #[test]
    fn test_change_structure_while_paused_goes_idle() {
        let mut session = session();
        session.start().unwrap();
        session.skip();
        session.pause();
        session.change_structure("turbo").unwrap();

        let state = session.state();
        assert_eq!(state.structure.id, "turbo");
        assert!(!state.is_paused && !state.is_running);
        assert_eq!(state.current_level, 0);
        assert_eq!(state.time_remaining, 600);
    }

    #[test]
    fn test_change_to_unknown_structure() {
        let mut session = session();
        assert!(matches!(
            session.change_structure("nope"),
            Err(TournamentError::Validation(ValidationError::UnknownStructure(id))) if id == "nope"
        ));
    }

    #[test]
    fn test_update_structure_rejected_while_running() {
        let mut session = session();
        session.start().unwrap();
        let update = StructureUpdate {
            buy_in: Some(500),
            ..Default::default()
        };
        assert!(session.update_structure(&update).is_err());
        assert_eq!(session.structure().buy_in, 100);
    }

    #[test]
    fn test_update_structure_rederives_idle_state() {
        let mut session = session();
        session.start().unwrap();
        session.skip();
        session.pause();

        let update = StructureUpdate {
            buy_in: Some(150),
            ..Default::default()
        };
        session.update_structure(&update).unwrap();

        let state = session.state();
        assert_eq!(state.structure.buy_in, 150);
        assert_eq!(state.structure.double_buy_in, 300);
        assert_eq!(state.current_level, 0);
        assert!(!state.is_paused);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut session = session();
        session.skip();
        let outcome = session.update_structure(&StructureUpdate::default()).unwrap();
        assert!(!outcome.changed);
        assert_eq!(session.state().current_level, 1);
    }

    #[test]
    fn test_eliminate_records_clock_level() {
        let mut session = session();
        let alice = add(&mut session, "Alice");
        add(&mut session, "Bob");
        session.skip();
        session.skip();

        let outcome = session.eliminate_player(alice).unwrap();
        let player = outcome.player.unwrap();
        assert_eq!(player.elimination_level, Some(2));
        assert_eq!(player.position, Some(2));
        assert_eq!(session.state().players_remaining, 1);
    }

    #[test]
    fn test_rebuy_respects_structure_flag() {
        let mut session = session();
        session.change_structure("turbo").unwrap();
        let alice = add(&mut session, "Alice");
        assert!(matches!(
            session.record_rebuy(alice),
            Err(TournamentError::Validation(ValidationError::RebuyNotAllowed))
        ));
        assert!(matches!(
            session.record_addon(alice),
            Err(TournamentError::Validation(ValidationError::AddonNotAllowed))
        ));
    }

    #[test]
    fn test_rebuy_adds_starting_stack() {
        let mut session = session();
        let alice = add(&mut session, "Alice");
        let before = session.state().total_chips;
        session.record_rebuy(alice).unwrap();
        assert_eq!(
            session.state().total_chips,
            before + session.structure().starting_chips
        );
    }

    #[test]
    fn test_apply_returns_resulting_state() {
        let mut session = session();
        let outcome = session
            .apply(SessionCommand::AddPlayer {
                name: "Alice".to_string(),
                buy_in_type: BuyInType::Double,
                paid_admin_fee: false,
            })
            .unwrap();
        let state = outcome.state.unwrap();
        assert_eq!(state.total_players, 1);
        assert_eq!(state, session.state());

        let outcome = session.apply(SessionCommand::Pause).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.state.is_some());
    }

    #[test]
    fn test_oversized_update_keeps_session_usable() {
        let mut session = session();
        add(&mut session, "Alice");
        let before = session.state();

        let update = StructureUpdate {
            buy_in: Some(i64::MAX),
            ..Default::default()
        };
        assert!(matches!(
            session.apply(SessionCommand::UpdateStructure { update }),
            Err(TournamentError::Validation(ValidationError::AmountTooLarge { field: "buy_in", .. }))
        ));
        assert_eq!(session.state(), before);
        assert!(session.apply(SessionCommand::Start).unwrap().changed);
    }

    #[test]
    fn test_standings_order() {
        let mut session = session();
        let alice = add(&mut session, "Alice");
        let bob = add(&mut session, "Bob");
        let carol = add(&mut session, "Carol");
        session.eliminate_player(bob).unwrap();
        session.eliminate_player(alice).unwrap();

        let standings = session.standings();
        let active: Vec<PlayerId> = standings.active.iter().map(|p| p.id).collect();
        let eliminated: Vec<PlayerId> = standings.eliminated.iter().map(|p| p.id).collect();
        assert_eq!(active, vec![carol]);
        assert_eq!(eliminated, vec![bob, alice]);
    }

    #[test]
    fn test_remove_unknown_player_is_unchanged() {
        let mut session = session();
        let outcome = session.remove_player(PlayerId::new_v4());
        assert!(!outcome.changed);
    }

    #[test]
    fn test_reset_session_keeps_structure() {
        let mut session = session();
        session.change_structure("deep-stack").unwrap();
        add(&mut session, "Alice");
        session.start().unwrap();
        session.skip();

        session.reset_session();
        let state = session.state();
        assert_eq!(state.structure.id, "deep-stack");
        assert_eq!(state.total_players, 0);
        assert_eq!(state.current_level, 0);
        assert!(!state.is_running);
        assert_eq!(state.time_remaining, 1800);
    }

    #[test]
    fn test_empty_structure_cannot_start() {
        let mut empty = StructureCatalog::builtin().default_structure().clone();
        empty.id = "empty".to_string();
        empty.blind_levels.clear();
        let catalog = Arc::new(StructureCatalog::new(vec![empty]).unwrap());

        let mut session = TournamentSession::new(catalog);
        assert!(matches!(
            session.apply(SessionCommand::Start),
            Err(TournamentError::Configuration(ConfigurationError::NoLevels(_)))
        ));
        assert!(!session.state().is_running);
    }

    #[test]
    fn test_view_display_helpers() {
        let mut session = session();
        add(&mut session, "Alice");
        add(&mut session, "Bob");
        let view = session.view();
        assert_eq!(view.clock_display, "20:00");
        assert_eq!(view.phase, ClockPhase::Idle);
        assert_eq!(view.time_status, TimeStatus::Normal);
        assert_eq!(view.average_stack, Some(10_000));
        assert_eq!(view.current_blind.and_then(|l| l.level), Some(1));
        assert_eq!(view.next_blind.and_then(|l| l.level), Some(2));
    }

    #[test]
    fn test_restore_round_trip() {
        let mut session = session();
        let alice = add(&mut session, "Alice");
        add(&mut session, "Bob");
        session.start().unwrap();
        for _ in 0..30 {
            session.tick();
        }
        session.eliminate_player(alice).unwrap();
        session.pause();

        let snapshot = session.snapshot();
        let restored = TournamentSession::restore(session.catalog().clone(), snapshot).unwrap();
        assert_eq!(restored.state(), session.state());
        assert_eq!(restored.players(), session.players());
    }

    #[test]
    fn test_restore_rejects_other_versions() {
        let mut snapshot = session().snapshot();
        snapshot.version = 99;
        assert!(matches!(
            TournamentSession::restore(Arc::new(StructureCatalog::builtin()), snapshot),
            Err(PersistenceError::UnsupportedVersion { found: 99, .. })
        ));
    }
}
