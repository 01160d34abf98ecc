//! Clock notifications and time-status classification.

use serde::{Deserialize, Serialize};

/// Remaining time at or below which the clock is in the warning band
pub const WARNING_THRESHOLD_SECS: u32 = 300;

/// Remaining time at or below which the clock is in the critical band
pub const CRITICAL_THRESHOLD_SECS: u32 = 60;

/// Styling band for the remaining time of the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStatus {
    Normal,
    Warning,
    Critical,
}

impl TimeStatus {
    /// Classify a remaining time in seconds
    pub fn from_remaining(secs: u32) -> Self {
        if secs <= CRITICAL_THRESHOLD_SECS {
            TimeStatus::Critical
        } else if secs <= WARNING_THRESHOLD_SECS {
            TimeStatus::Warning
        } else {
            TimeStatus::Normal
        }
    }
}

/// Discrete notification emitted by the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClockEvent {
    /// Remaining time crossed into the warning band
    Warning { level_index: usize },
    /// Remaining time crossed into the critical band
    Critical { level_index: usize },
    /// A new blind level began
    LevelUp { level_index: usize },
    /// A break began
    Break { level_index: usize },
    /// The last level expired
    Finished,
}

impl ClockEvent {
    /// Tone the notifier should play for this event
    pub fn tone(&self) -> Tone {
        match self {
            ClockEvent::Warning { .. } => Tone::WARNING,
            ClockEvent::Critical { .. } => Tone::CRITICAL,
            ClockEvent::LevelUp { .. } | ClockEvent::Finished => Tone::LEVEL_UP,
            ClockEvent::Break { .. } => Tone::BREAK,
        }
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ClockEvent::Warning { .. } => "warning",
            ClockEvent::Critical { .. } => "critical",
            ClockEvent::LevelUp { .. } => "level_up",
            ClockEvent::Break { .. } => "break",
            ClockEvent::Finished => "finished",
        }
    }
}

/// A fixed beep: frequency, gain and length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: u32,
    pub gain: f32,
    pub duration_ms: u32,
}

impl Tone {
    pub const WARNING: Tone = Tone {
        frequency_hz: 800,
        gain: 0.1,
        duration_ms: 200,
    };

    pub const CRITICAL: Tone = Tone {
        frequency_hz: 1000,
        gain: 0.2,
        duration_ms: 500,
    };

    pub const LEVEL_UP: Tone = Tone {
        frequency_hz: 600,
        gain: 0.15,
        duration_ms: 1000,
    };

    pub const BREAK: Tone = Tone {
        frequency_hz: 400,
        gain: 0.1,
        duration_ms: 800,
    };
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
