//! Session actor configuration.

use std::time::Duration;

/// Default countdown tick period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Runtime tuning for a [`SessionActor`](super::SessionActor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Wall-clock time per countdown second. Shortened in tests.
    pub tick_interval: Duration,

    /// Capacity of the actor inbox
    pub inbox_capacity: usize,

    /// Per-subscriber notification buffer; a full buffer drops notifications
    pub subscriber_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            inbox_capacity: 100,
            subscriber_capacity: 32,
        }
    }
}

impl SessionConfig {
    /// Default configuration with a custom tick interval
    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            ..Self::default()
        }
    }
}
