//! Player data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Player ID type
pub type PlayerId = Uuid;

/// Buy-in option chosen at registration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuyInType {
    #[default]
    Normal,
    Double,
}

/// A registered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID, generated at registration
    pub id: PlayerId,
    /// Display name (trimmed, non-empty)
    pub name: String,
    /// Whether the player has busted out
    pub is_eliminated: bool,
    /// Finishing position, 1 = winner (set once at elimination)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Clock level index at elimination (set once at elimination)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elimination_level: Option<usize>,
    /// Nominal chip count; stacks are derived from the structure instead
    pub chips: i64,
    /// Number of rebuys taken
    pub rebuys: u32,
    /// Number of addons taken
    pub addons: u32,
    /// Buy-in option
    pub buy_in_type: BuyInType,
    /// Whether the admin fee was paid
    pub paid_admin_fee: bool,
    /// Registration timestamp
    pub registered_at: DateTime<Utc>,
}

impl Player {
    pub(crate) fn register(name: String, buy_in_type: BuyInType, paid_admin_fee: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            is_eliminated: false,
            position: None,
            elimination_level: None,
            chips: 0,
            rebuys: 0,
            addons: 0,
            buy_in_type,
            paid_admin_fee,
            registered_at: Utc::now(),
        }
    }

    /// Whether the player is still in the tournament
    pub fn is_active(&self) -> bool {
        !self.is_eliminated
    }
}
