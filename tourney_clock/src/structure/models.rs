//! Blind level and tournament structure data models.

use crate::errors::{ConfigurationError, TournamentResult, ValidationError};
use crate::roster::BuyInType;
use serde::{Deserialize, Serialize};

/// Default break length in minutes for structures that do not set one.
pub const DEFAULT_BREAK_MINUTES: u32 = 15;

/// Largest chip or money amount a structure may carry.
///
/// Keeps 2× derivation and roster totals well inside `i64`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

fn check_amount(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeAmount { field, value });
    }
    if value > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge {
            field,
            value,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

fn doubled(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    let double = value.saturating_mul(2);
    check_amount(field, double)?;
    Ok(double)
}

/// One timed step of a structure: either a blind level or a break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindLevel {
    /// Level number (1-indexed). Breaks carry no number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Small blind amount
    pub small_blind: i64,
    /// Big blind amount
    pub big_blind: i64,
    /// Ante amount
    #[serde(default)]
    pub ante: i64,
    /// Duration of this step in minutes
    pub duration: u32,
    /// Whether this step is a break
    #[serde(default)]
    pub is_break: bool,
    /// Break length in minutes, shown on the display (breaks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_duration: Option<u32>,
}

impl BlindLevel {
    /// Create a new blind level
    pub fn new(level: u32, small_blind: i64, big_blind: i64, duration: u32) -> Self {
        Self {
            level: Some(level),
            small_blind,
            big_blind,
            ante: 0,
            duration,
            is_break: false,
            break_duration: None,
        }
    }

    /// Create a blind level with ante
    pub fn with_ante(mut self, ante: i64) -> Self {
        self.ante = ante;
        self
    }

    /// Create a break lasting `minutes`.
    pub fn pause_for(minutes: u32) -> Self {
        Self {
            level: None,
            small_blind: 0,
            big_blind: 0,
            ante: 0,
            duration: minutes,
            is_break: true,
            break_duration: Some(minutes),
        }
    }

    /// Countdown length of this step in seconds
    pub fn duration_secs(&self) -> u32 {
        self.duration.saturating_mul(60)
    }

    /// Check the level is either a valid blind triple or a valid break.
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidBlindLevel {
            index,
            reason: reason.to_string(),
        };

        if self.duration == 0 {
            return Err(invalid("duration must be greater than 0"));
        }

        if self.is_break {
            return match self.break_duration {
                Some(minutes) if minutes > 0 => Ok(()),
                _ => Err(invalid("break must have a break duration greater than 0")),
            };
        }

        if self.break_duration.is_some() {
            return Err(invalid("only breaks carry a break duration"));
        }
        match self.level {
            Some(n) if n >= 1 => {}
            _ => return Err(invalid("blind level number must be at least 1")),
        }
        if self.small_blind < 0 || self.big_blind < 0 || self.ante < 0 {
            return Err(invalid("blinds and ante must be non-negative"));
        }
        if self.big_blind < self.small_blind {
            return Err(invalid("big blind must be at least the small blind"));
        }

        Ok(())
    }
}

/// A named template of blind levels plus its monetary and chip parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentStructure {
    /// Unique catalog key
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Ordered levels and breaks
    pub blind_levels: Vec<BlindLevel>,
    /// Chips for a normal buy-in (also the rebuy stack)
    pub starting_chips: i64,
    /// Chips for a double buy-in
    pub double_buy_in_chips: i64,
    /// Chips granted per addon
    pub addon_chips: i64,
    /// Bonus chips for paying the admin fee
    pub admin_fee_chips: i64,
    /// Normal buy-in price
    pub buy_in: i64,
    /// Double buy-in price
    pub double_buy_in: i64,
    /// Admin fee price
    pub admin_fee: i64,
    /// Addon price
    pub addon: i64,
    /// Prize pool floor
    pub guaranteed_prize: i64,
    /// Whether rebuys are allowed
    pub rebuy_allowed: bool,
    /// Whether addons are allowed
    pub addon_allowed: bool,
    /// Default break length in minutes
    #[serde(default = "default_break_minutes")]
    pub break_duration: u32,
}

fn default_break_minutes() -> u32 {
    DEFAULT_BREAK_MINUTES
}

impl TournamentStructure {
    /// Check the structure can drive a clock.
    ///
    /// An empty level list is a configuration error; everything else is a
    /// validation error.
    pub fn validate(&self) -> TournamentResult<()> {
        if self.blind_levels.is_empty() {
            return Err(ConfigurationError::NoLevels(self.id.clone()).into());
        }

        for (index, level) in self.blind_levels.iter().enumerate() {
            level.validate(index)?;
        }

        for (field, value) in self.amounts() {
            check_amount(field, value)?;
        }

        Ok(())
    }

    fn amounts(&self) -> [(&'static str, i64); 9] {
        [
            ("starting_chips", self.starting_chips),
            ("double_buy_in_chips", self.double_buy_in_chips),
            ("addon_chips", self.addon_chips),
            ("admin_fee_chips", self.admin_fee_chips),
            ("buy_in", self.buy_in),
            ("double_buy_in", self.double_buy_in),
            ("admin_fee", self.admin_fee),
            ("addon", self.addon),
            ("guaranteed_prize", self.guaranteed_prize),
        ]
    }

    /// Get the level at `index`
    pub fn level(&self, index: usize) -> Option<&BlindLevel> {
        self.blind_levels.get(index)
    }

    /// Countdown length of the first level in seconds, 0 with no levels
    pub fn first_level_secs(&self) -> u32 {
        self.blind_levels
            .first()
            .map(BlindLevel::duration_secs)
            .unwrap_or(0)
    }

    /// Total scheduled time of all levels and breaks in seconds
    pub fn total_duration_secs(&self) -> u64 {
        self.blind_levels
            .iter()
            .map(|level| u64::from(level.duration_secs()))
            .sum()
    }

    /// Starting stack for a buy-in type
    pub fn chips_for(&self, buy_in_type: BuyInType) -> i64 {
        match buy_in_type {
            BuyInType::Normal => self.starting_chips,
            BuyInType::Double => self.double_buy_in_chips,
        }
    }

    /// Price for a buy-in type
    pub fn price_for(&self, buy_in_type: BuyInType) -> i64 {
        match buy_in_type {
            BuyInType::Normal => self.buy_in,
            BuyInType::Double => self.double_buy_in,
        }
    }

    /// Merge a partial edit into this structure.
    ///
    /// The level sequence is never touched. When `starting_chips` or `buy_in`
    /// change without an explicit double value, the double value follows at 2×.
    ///
    /// On error the structure is left as it was.
    pub fn apply(&mut self, update: &StructureUpdate) -> Result<(), ValidationError> {
        update.validate()?;

        let mut next = self.clone();
        next.merge(update)?;
        *self = next;
        Ok(())
    }

    fn merge(&mut self, update: &StructureUpdate) -> Result<(), ValidationError> {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }

        if let Some(chips) = update.starting_chips {
            self.starting_chips = chips;
            self.double_buy_in_chips = doubled("double_buy_in_chips", chips)?;
        }
        if let Some(chips) = update.double_buy_in_chips {
            self.double_buy_in_chips = chips;
        }
        if let Some(chips) = update.addon_chips {
            self.addon_chips = chips;
        }
        if let Some(chips) = update.admin_fee_chips {
            self.admin_fee_chips = chips;
        }

        if let Some(price) = update.buy_in {
            self.buy_in = price;
            self.double_buy_in = doubled("double_buy_in", price)?;
        }
        if let Some(price) = update.double_buy_in {
            self.double_buy_in = price;
        }
        if let Some(price) = update.admin_fee {
            self.admin_fee = price;
        }
        if let Some(price) = update.addon {
            self.addon = price;
        }
        if let Some(prize) = update.guaranteed_prize {
            self.guaranteed_prize = prize;
        }

        if let Some(allowed) = update.rebuy_allowed {
            self.rebuy_allowed = allowed;
        }
        if let Some(allowed) = update.addon_allowed {
            self.addon_allowed = allowed;
        }
        if let Some(minutes) = update.break_duration {
            self.break_duration = minutes;
        }

        Ok(())
    }
}

/// Partial edit of a structure's metadata, monetary and chip fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub starting_chips: Option<i64>,
    pub double_buy_in_chips: Option<i64>,
    pub addon_chips: Option<i64>,
    pub admin_fee_chips: Option<i64>,
    pub buy_in: Option<i64>,
    pub double_buy_in: Option<i64>,
    pub admin_fee: Option<i64>,
    pub addon: Option<i64>,
    pub guaranteed_prize: Option<i64>,
    pub rebuy_allowed: Option<bool>,
    pub addon_allowed: Option<bool>,
    pub break_duration: Option<u32>,
}

impl StructureUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        let amounts = [
            ("starting_chips", self.starting_chips),
            ("double_buy_in_chips", self.double_buy_in_chips),
            ("addon_chips", self.addon_chips),
            ("admin_fee_chips", self.admin_fee_chips),
            ("buy_in", self.buy_in),
            ("double_buy_in", self.double_buy_in),
            ("admin_fee", self.admin_fee),
            ("addon", self.addon),
            ("guaranteed_prize", self.guaranteed_prize),
        ];

        for (field, value) in amounts {
            if let Some(value) = value {
                check_amount(field, value)?;
            }
        }

        Ok(())
    }

    /// Whether the update carries no edits at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TournamentError;

    fn sample() -> TournamentStructure {
        TournamentStructure {
            id: "sample".to_string(),
            name: "Sample".to_string(),
            description: String::new(),
            blind_levels: vec![
                BlindLevel::new(1, 25, 50, 20),
                BlindLevel::new(2, 50, 100, 20).with_ante(100),
                BlindLevel::pause_for(10),
                BlindLevel::new(3, 100, 200, 20).with_ante(200),
            ],
            starting_chips: 10_000,
            double_buy_in_chips: 20_000,
            addon_chips: 5_000,
            admin_fee_chips: 1_000,
            buy_in: 100,
            double_buy_in: 200,
            admin_fee: 20,
            addon: 50,
            guaranteed_prize: 1_000,
            rebuy_allowed: true,
            addon_allowed: true,
            break_duration: 10,
        }
    }

    #[test]
    fn test_blind_level_with_ante() {
        let level = BlindLevel::new(5, 100, 200, 15).with_ante(25);
        assert_eq!(level.ante, 25);
        assert_eq!(level.duration_secs(), 900);
        assert!(level.validate(0).is_ok());
    }

    #[test]
    fn test_break_level_is_valid() {
        let level = BlindLevel::pause_for(15);
        assert!(level.is_break);
        assert_eq!(level.level, None);
        assert_eq!(level.break_duration, Some(15));
        assert!(level.validate(0).is_ok());
    }

    #[test]
    fn test_break_without_duration_is_invalid() {
        let mut level = BlindLevel::pause_for(15);
        level.break_duration = None;
        assert!(matches!(
            level.validate(3),
            Err(ValidationError::InvalidBlindLevel { index: 3, .. })
        ));
    }

    #[test]
    fn test_zero_duration_is_invalid() {
        let level = BlindLevel::new(1, 10, 20, 0);
        assert!(level.validate(0).is_err());
    }

    #[test]
    fn test_big_blind_below_small_blind_is_invalid() {
        let level = BlindLevel::new(1, 50, 25, 10);
        assert!(level.validate(0).is_err());
    }

    #[test]
    fn test_structure_validates() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_empty_structure_is_configuration_error() {
        let mut structure = sample();
        structure.blind_levels.clear();
        assert!(matches!(
            structure.validate(),
            Err(TournamentError::Configuration(ConfigurationError::NoLevels(_)))
        ));
        assert_eq!(structure.first_level_secs(), 0);
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let mut structure = sample();
        structure.guaranteed_prize = -1;
        assert!(matches!(
            structure.validate(),
            Err(TournamentError::Validation(ValidationError::NegativeAmount {
                field: "guaranteed_prize",
                value: -1
            }))
        ));
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(sample().total_duration_secs(), 70 * 60);
        assert_eq!(sample().first_level_secs(), 1200);
    }

    #[test]
    fn test_chips_and_price_by_buy_in_type() {
        let structure = sample();
        assert_eq!(structure.chips_for(BuyInType::Normal), 10_000);
        assert_eq!(structure.chips_for(BuyInType::Double), 20_000);
        assert_eq!(structure.price_for(BuyInType::Normal), 100);
        assert_eq!(structure.price_for(BuyInType::Double), 200);
    }

    #[test]
    fn test_update_derives_double_values() {
        let mut structure = sample();
        let update = StructureUpdate {
            starting_chips: Some(15_000),
            buy_in: Some(150),
            ..Default::default()
        };
        structure.apply(&update).unwrap();
        assert_eq!(structure.double_buy_in_chips, 30_000);
        assert_eq!(structure.double_buy_in, 300);
    }

    #[test]
    fn test_update_keeps_explicit_overrides() {
        let mut structure = sample();
        let update = StructureUpdate {
            starting_chips: Some(15_000),
            double_buy_in_chips: Some(25_000),
            buy_in: Some(150),
            double_buy_in: Some(250),
            ..Default::default()
        };
        structure.apply(&update).unwrap();
        assert_eq!(structure.double_buy_in_chips, 25_000);
        assert_eq!(structure.double_buy_in, 250);
    }

    #[test]
    fn test_update_never_touches_levels() {
        let mut structure = sample();
        let levels = structure.blind_levels.clone();
        let update = StructureUpdate {
            name: Some("Renamed".to_string()),
            guaranteed_prize: Some(5_000),
            addon_allowed: Some(false),
            ..Default::default()
        };
        structure.apply(&update).unwrap();
        assert_eq!(structure.blind_levels, levels);
        assert_eq!(structure.name, "Renamed");
        assert_eq!(structure.guaranteed_prize, 5_000);
        assert!(!structure.addon_allowed);
    }

    #[test]
    fn test_negative_update_leaves_structure_untouched() {
        let mut structure = sample();
        let before = structure.clone();
        let update = StructureUpdate {
            starting_chips: Some(20_000),
            addon: Some(-5),
            ..Default::default()
        };
        assert!(structure.apply(&update).is_err());
        assert_eq!(structure, before);
    }

    #[test]
    fn test_huge_update_is_rejected_without_overflow() {
        let mut structure = sample();
        let before = structure.clone();

        let update = StructureUpdate {
            name: Some("Renamed".to_string()),
            starting_chips: Some(i64::MAX / 2 + 1),
            ..Default::default()
        };
        assert_eq!(
            structure.apply(&update),
            Err(ValidationError::AmountTooLarge {
                field: "starting_chips",
                value: i64::MAX / 2 + 1,
                max: MAX_AMOUNT,
            })
        );

        let update = StructureUpdate {
            buy_in: Some(i64::MAX),
            ..Default::default()
        };
        assert!(matches!(
            structure.apply(&update),
            Err(ValidationError::AmountTooLarge { field: "buy_in", .. })
        ));
        assert_eq!(structure, before);
    }

    #[test]
    fn test_derived_double_respects_limit() {
        let mut structure = sample();
        let update = StructureUpdate {
            starting_chips: Some(MAX_AMOUNT / 2),
            buy_in: Some(MAX_AMOUNT / 2),
            ..Default::default()
        };
        structure.apply(&update).unwrap();
        assert_eq!(structure.double_buy_in_chips, MAX_AMOUNT);
        assert_eq!(structure.double_buy_in, MAX_AMOUNT);
        assert!(structure.validate().is_ok());

        let update = StructureUpdate {
            starting_chips: Some(MAX_AMOUNT),
            ..Default::default()
        };
        assert!(matches!(
            structure.apply(&update),
            Err(ValidationError::AmountTooLarge {
                field: "double_buy_in_chips",
                ..
            })
        ));
        assert_eq!(structure.starting_chips, MAX_AMOUNT / 2);
    }

    #[test]
    fn test_oversized_structure_fails_validation() {
        let mut structure = sample();
        structure.addon_chips = i64::MAX;
        assert!(matches!(
            structure.validate(),
            Err(TournamentError::Validation(ValidationError::AmountTooLarge {
                field: "addon_chips",
                ..
            }))
        ));
    }

    #[test]
    fn test_empty_update() {
        assert!(StructureUpdate::default().is_empty());
        let update = StructureUpdate {
            admin_fee: Some(10),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
