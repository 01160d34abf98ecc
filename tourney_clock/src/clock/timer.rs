//! Countdown state machine over a structure's level sequence.

use super::events::{
    CRITICAL_THRESHOLD_SECS, ClockEvent, TimeStatus, WARNING_THRESHOLD_SECS,
};
use crate::errors::{ConfigurationError, PersistenceError, TournamentResult, ValidationError};
use crate::structure::{BlindLevel, TournamentStructure};
use serde::{Deserialize, Serialize};

/// Clock lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockPhase {
    /// Not started since the last reset
    Idle,
    /// Counting down
    Running,
    /// Frozen by the operator
    Paused,
    /// Last level expired
    Finished,
}

/// Persisted view of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub is_running: bool,
    pub is_paused: bool,
    pub current_level: usize,
    pub time_remaining: u32,
}

/// Single-timeline countdown over an ordered list of levels.
///
/// The clock never schedules anything itself: a driver calls [`tick`] once
/// per second while [`is_running`] is true. All other transitions are
/// immediate operator commands.
///
/// [`tick`]: TournamentClock::tick
/// [`is_running`]: TournamentClock::is_running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentClock {
    structure_id: String,
    levels: Vec<BlindLevel>,
    phase: ClockPhase,
    current_level: usize,
    time_remaining: u32,
}

impl TournamentClock {
    /// Create an idle clock at the structure's first level
    pub fn new(structure: &TournamentStructure) -> Self {
        Self {
            structure_id: structure.id.clone(),
            levels: structure.blind_levels.clone(),
            phase: ClockPhase::Idle,
            current_level: 0,
            time_remaining: structure.first_level_secs(),
        }
    }

    /// Rebuild a clock from a persisted timer state.
    ///
    /// A clock saved while running comes back paused: time that passed while
    /// the process was down is not replayed.
    pub fn restore(
        structure: &TournamentStructure,
        state: TimerState,
    ) -> Result<Self, PersistenceError> {
        let mut clock = Self::new(structure);
        if clock.levels.is_empty() {
            return Ok(clock);
        }

        let level = clock.levels.get(state.current_level).ok_or_else(|| {
            PersistenceError::Invalid(format!(
                "level index {} out of range for structure '{}' ({} levels)",
                state.current_level,
                structure.id,
                clock.levels.len()
            ))
        })?;

        clock.current_level = state.current_level;
        clock.time_remaining = state.time_remaining.min(level.duration_secs());
        clock.phase = if state.is_running || state.is_paused {
            ClockPhase::Paused
        } else if clock.time_remaining == 0 {
            ClockPhase::Finished
        } else {
            ClockPhase::Idle
        };

        Ok(clock)
    }

    /// Begin or resume the countdown.
    ///
    /// Returns `Ok(false)` when already running.
    pub fn start(&mut self) -> TournamentResult<bool> {
        if self.levels.is_empty() {
            return Err(ConfigurationError::NoLevels(self.structure_id.clone()).into());
        }

        match self.phase {
            ClockPhase::Running => Ok(false),
            ClockPhase::Finished => Err(ValidationError::ClockFinished.into()),
            ClockPhase::Idle | ClockPhase::Paused => {
                self.phase = ClockPhase::Running;
                Ok(true)
            }
        }
    }

    /// Freeze the countdown. Returns false unless the clock was running.
    pub fn pause(&mut self) -> bool {
        if self.phase != ClockPhase::Running {
            return false;
        }
        self.phase = ClockPhase::Paused;
        true
    }

    /// Return to the first level, stopped
    pub fn reset(&mut self) {
        self.phase = ClockPhase::Idle;
        self.current_level = 0;
        self.time_remaining = self
            .levels
            .first()
            .map(BlindLevel::duration_secs)
            .unwrap_or(0);
    }

    /// Jump to the next level without changing the phase.
    ///
    /// Returns the level-up or break event, or `None` at the last level.
    pub fn skip(&mut self) -> Option<ClockEvent> {
        self.advance()
    }

    /// Replace the level sequence and go idle at its first level
    pub fn change_structure(&mut self, structure: &TournamentStructure) {
        *self = Self::new(structure);
    }

    /// Advance one second. No-op unless running.
    ///
    /// When the current level expires the clock moves to the next one and
    /// keeps running, or finishes after the last level. Warning and critical
    /// events fire only on the tick that crosses their threshold.
    pub fn tick(&mut self) -> Vec<ClockEvent> {
        if self.phase != ClockPhase::Running {
            return Vec::new();
        }

        if self.time_remaining <= 1 {
            return match self.advance() {
                Some(event) => vec![event],
                None => {
                    self.phase = ClockPhase::Finished;
                    self.time_remaining = 0;
                    vec![ClockEvent::Finished]
                }
            };
        }

        let before = self.time_remaining;
        self.time_remaining -= 1;
        let after = self.time_remaining;

        let crossed = |threshold: u32| before > threshold && after <= threshold;
        let level_index = self.current_level;

        let mut events = Vec::new();
        if crossed(WARNING_THRESHOLD_SECS) {
            events.push(ClockEvent::Warning { level_index });
        }
        if crossed(CRITICAL_THRESHOLD_SECS) {
            events.push(ClockEvent::Critical { level_index });
        }
        events
    }

    fn advance(&mut self) -> Option<ClockEvent> {
        let next = self.current_level + 1;
        let level = self.levels.get(next)?;

        self.current_level = next;
        self.time_remaining = level.duration_secs();

        Some(if level.is_break {
            ClockEvent::Break { level_index: next }
        } else {
            ClockEvent::LevelUp { level_index: next }
        })
    }

    /// Current phase
    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// Whether the countdown is active
    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    /// Whether the operator paused the countdown
    pub fn is_paused(&self) -> bool {
        self.phase == ClockPhase::Paused
    }

    /// Index of the current level
    pub fn current_level(&self) -> usize {
        self.current_level
    }

    /// Seconds left in the current level
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn levels(&self) -> &[BlindLevel] {
        &self.levels
    }

    pub fn current_blind(&self) -> Option<&BlindLevel> {
        self.levels.get(self.current_level)
    }

    pub fn next_blind(&self) -> Option<&BlindLevel> {
        self.levels.get(self.current_level + 1)
    }

    /// Styling band of the remaining time
    pub fn time_status(&self) -> TimeStatus {
        TimeStatus::from_remaining(self.time_remaining)
    }

    /// Percentage of the current level already elapsed
    pub fn level_progress(&self) -> f64 {
        let total = self.current_blind().map(BlindLevel::duration_secs).unwrap_or(0);
        if total == 0 {
            return 0.0;
        }
        f64::from(total.saturating_sub(self.time_remaining)) / f64::from(total) * 100.0
    }

    /// Snapshot for persistence
    pub fn timer_state(&self) -> TimerState {
        TimerState {
            is_running: self.is_running(),
            is_paused: self.is_paused(),
            current_level: self.current_level,
            time_remaining: self.time_remaining,
        }
    }
}
