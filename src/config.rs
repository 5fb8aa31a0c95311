//! Tunable constants for proximity, costs and payouts.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Step costs for every choice the dispatcher can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    /// Monster intro: start the battle.
    pub fight: u32,
    /// Monster intro: study the creature and walk away.
    pub observe: u32,
    /// Combat attack.
    pub attack: u32,
    /// Combat defend.
    pub defend: u32,
    /// Flee, both from the monster intro and mid-battle.
    pub flee: u32,
    /// POI puzzle or mystery investigation.
    pub investigate: u32,
    /// POI sample.
    pub sample: u32,
    /// Mystery meditation.
    pub meditate: u32,
    /// Leaving a POI or mystery zone.
    pub leave: u32,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            fight: 0,
            observe: 5,
            attack: 10,
            defend: 5,
            flee: 20,
            investigate: 15,
            sample: 5,
            meditate: 5,
            leave: 0,
        }
    }
}

/// Half-open integer range `[min, max)` used for random payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRange {
    /// Inclusive lower bound.
    pub min: u32,
    /// Exclusive upper bound.
    pub max: u32,
}

impl RewardRange {
    /// Create a range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the range.
    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        (self.min..self.max).contains(&value)
    }
}

/// Engine configuration.
///
/// Every field has a default, so a JSON file only needs the values it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Entities closer than this trigger an encounter (meters).
    pub trigger_radius_m: f64,
    /// Entities closer than this, but outside the trigger radius, raise a warning.
    pub warning_radius_m: f64,
    /// Minimum time between two proximity scans (milliseconds).
    pub scan_interval_ms: u64,
    /// Meters walked per step earned.
    pub meters_per_step: f64,
    /// Position changes shorter than this are treated as GPS jitter.
    pub jitter_threshold_m: f64,
    /// Steps in the wallet at session start.
    pub starting_steps: u32,
    /// Step cost table.
    pub costs: ActionCosts,
    /// Step payout for a combat victory.
    pub victory_steps: RewardRange,
    /// Experience payout for a combat victory.
    pub victory_experience: RewardRange,
    /// Fraction of max health restored after a defeat.
    pub defeat_restore_ratio: f64,
    /// Modifier on the monster's flee-resistance roll.
    pub flee_resistance: i32,
    /// Temporary defense bonus while defending.
    pub defend_bonus: i32,
    /// Difficulty class of POI puzzles.
    pub puzzle_dc: i32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            trigger_radius_m: 50.0,
            warning_radius_m: 100.0,
            scan_interval_ms: 3000,
            meters_per_step: 100.0,
            jitter_threshold_m: 10.0,
            starting_steps: 0,
            costs: ActionCosts::default(),
            victory_steps: RewardRange::new(25, 75),
            victory_experience: RewardRange::new(20, 60),
            defeat_restore_ratio: 0.5,
            flee_resistance: 10,
            defend_bonus: 5,
            puzzle_dc: 15,
        }
    }
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid JSON for this schema.
    Parse(serde_json::Error),
    /// A value is out of range or inconsistent with another.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config: {e}"),
            Self::Parse(e) => write!(f, "failed to parse config: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl EncounterConfig {
    /// Load a configuration from a JSON file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a configuration from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or fails validation.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable together.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.trigger_radius_m.is_finite() && self.trigger_radius_m > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "trigger_radius_m must be positive, got {}",
                self.trigger_radius_m
            )));
        }
        if !(self.warning_radius_m.is_finite() && self.warning_radius_m > self.trigger_radius_m) {
            return Err(ConfigError::Invalid(format!(
                "warning_radius_m ({}) must exceed trigger_radius_m ({})",
                self.warning_radius_m, self.trigger_radius_m
            )));
        }
        if self.scan_interval_ms == 0 {
            return Err(ConfigError::Invalid("scan_interval_ms must be non-zero".into()));
        }
        if !(self.meters_per_step.is_finite() && self.meters_per_step > 0.0) {
            return Err(ConfigError::Invalid("meters_per_step must be positive".into()));
        }
        if !(self.jitter_threshold_m.is_finite() && self.jitter_threshold_m >= 0.0) {
            return Err(ConfigError::Invalid("jitter_threshold_m must be non-negative".into()));
        }
        for (name, range) in [
            ("victory_steps", self.victory_steps),
            ("victory_experience", self.victory_experience),
        ] {
            if range.max <= range.min {
                return Err(ConfigError::Invalid(format!(
                    "{name} range [{}, {}) is empty",
                    range.min, range.max
                )));
            }
        }
        if !(self.defeat_restore_ratio > 0.0 && self.defeat_restore_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "defeat_restore_ratio must be in (0, 1], got {}",
                self.defeat_restore_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EncounterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan_interval_ms, 3000);
        assert_eq!(config.costs.attack, 10);
        assert_eq!(config.costs.defend, 5);
        assert_eq!(config.costs.flee, 20);
        assert_eq!(config.victory_steps, RewardRange::new(25, 75));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            EncounterConfig::from_json(r#"{"trigger_radius_m": 30.0, "costs": {"attack": 12}}"#)
                .unwrap();
        assert!((config.trigger_radius_m - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.costs.attack, 12);
        assert_eq!(config.costs.flee, 20);
        assert_eq!(config.scan_interval_ms, 3000);
    }

    #[test]
    fn test_warning_radius_must_exceed_trigger() {
        let result = EncounterConfig::from_json(r#"{"warning_radius_m": 40.0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_reward_range_rejected() {
        let result = EncounterConfig::from_json(r#"{"victory_steps": {"min": 10, "max": 10}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = EncounterConfig::from_json(r#"{"scan_interval_ms": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = EncounterConfig::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_reward_range_contains() {
        let range = RewardRange::new(25, 75);
        assert!(range.contains(25));
        assert!(range.contains(74));
        assert!(!range.contains(75));
    }
}
