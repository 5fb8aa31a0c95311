//! Scripted walks loaded from JSON.
//!
//! ```json
//! {
//!   "seed": 7,
//!   "starting_steps": 120,
//!   "strategy": "cautious",
//!   "config": { "trigger_radius_m": 40.0 },
//!   "entities": [
//!     { "position": { "lat": 61.4761, "lng": 23.7255 }, "kind": "monster", "species": "void_walker" },
//!     { "position": { "lat": 61.4770, "lng": 23.7260 }, "kind": "poi", "site": "ancient_ruins", "rarity": "rare" }
//!   ],
//!   "waypoints": [ { "lat": 61.4761, "lng": 23.7254 } ]
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EncounterConfig};
use crate::dice::SeededDice;
use crate::game::Game;
use crate::geo::GeoPoint;
use crate::invariants;
use crate::player::PlayerState;
use crate::simulation::Strategy;
use crate::world::{EntityKind, World};

/// Seed used when a scenario names none.
pub const DEFAULT_SEED: u64 = 42;

/// Errors raised while loading a scenario.
#[derive(Debug)]
pub enum ScenarioError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not a valid scenario.
    Parse(serde_json::Error),
    /// The embedded configuration is invalid.
    Config(ConfigError),
    /// A position in the file is out of range.
    InvalidPosition {
        /// What the position belongs to.
        what: String,
        /// The offending point.
        point: GeoPoint,
    },
    /// The starting player breaks a state invariant.
    InvalidPlayer(String),
    /// A monster stat override cannot start a battle.
    InvalidStats {
        /// What the stats belong to.
        what: String,
        /// The offending health.
        health: i32,
    },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read scenario: {e}"),
            Self::Parse(e) => write!(f, "failed to parse scenario: {e}"),
            Self::Config(e) => write!(f, "scenario config: {e}"),
            Self::InvalidPosition { what, point } => {
                write!(f, "{what} has invalid position ({}, {})", point.lat, point.lng)
            }
            Self::InvalidPlayer(reason) => write!(f, "invalid starting player: {reason}"),
            Self::InvalidStats { what, health } => {
                write!(f, "{what} has non-positive health {health}")
            }
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::InvalidPosition { .. }
            | Self::InvalidPlayer(_)
            | Self::InvalidStats { .. } => None,
        }
    }
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<ConfigError> for ScenarioError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// An entity placed on the scenario map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntity {
    /// Where it stands.
    pub position: GeoPoint,
    /// What it is.
    #[serde(flatten)]
    pub kind: EntityKind,
}

/// A complete scripted walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Dice seed.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overrides `config.starting_steps`.
    #[serde(default)]
    pub starting_steps: Option<u32>,
    /// Engine configuration.
    #[serde(default)]
    pub config: EncounterConfig,
    /// Starting player; defaults when absent.
    #[serde(default)]
    pub player: Option<PlayerState>,
    /// How encounters are answered.
    #[serde(default)]
    pub strategy: Strategy,
    /// World entities.
    #[serde(default)]
    pub entities: Vec<PlacedEntity>,
    /// Player positions, one scan tick apart.
    pub waypoints: Vec<GeoPoint>,
}

impl Scenario {
    /// Load a scenario from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its
    /// configuration or positions are invalid.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a scenario from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid scenario.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check the embedded config, the starting player, stat overrides and
    /// every position.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.config.validate()?;
        if let Some(player) = &self.player {
            let violations = invariants::check_player(player);
            if !violations.is_empty() {
                let reasons: Vec<_> = violations.into_iter().map(|v| v.message).collect();
                return Err(ScenarioError::InvalidPlayer(reasons.join("; ")));
            }
        }
        for (index, placed) in self.entities.iter().enumerate() {
            if !placed.position.is_valid() {
                return Err(ScenarioError::InvalidPosition {
                    what: format!("entity {index} ({})", placed.kind.name()),
                    point: placed.position,
                });
            }
            if let Some(stats) = placed.kind.stat_block().filter(|s| s.health <= 0) {
                return Err(ScenarioError::InvalidStats {
                    what: format!("entity {index} ({})", placed.kind.name()),
                    health: stats.health,
                });
            }
        }
        for (index, point) in self.waypoints.iter().enumerate() {
            if !point.is_valid() {
                return Err(ScenarioError::InvalidPosition {
                    what: format!("waypoint {index}"),
                    point: *point,
                });
            }
        }
        Ok(())
    }

    /// Build the world described by the scenario.
    #[must_use]
    pub fn build_world(&self) -> World {
        let mut world = World::new();
        for placed in &self.entities {
            world.spawn(placed.position, placed.kind.clone());
        }
        world
    }

    /// Build a ready-to-play game. `seed` overrides the scenario's seed.
    #[must_use]
    pub fn build_game(&self, seed: Option<u64>) -> Game<SeededDice> {
        let seed = seed.or(self.seed).unwrap_or(DEFAULT_SEED);
        let mut config = self.config;
        if let Some(steps) = self.starting_steps {
            config.starting_steps = steps;
        }
        let game = Game::new(config, self.build_world(), SeededDice::new(seed));
        match &self.player {
            Some(player) => game.with_player(player.clone()),
            None => game,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{PoiSite, Species};

    const SAMPLE: &str = r#"{
        "seed": 7,
        "starting_steps": 120,
        "strategy": "cautious",
        "entities": [
            { "position": { "lat": 61.4761, "lng": 23.7255 }, "kind": "monster", "species": "void_walker" },
            { "position": { "lat": 61.4770, "lng": 23.7260 }, "kind": "poi", "site": "ancient_ruins", "rarity": "rare" }
        ],
        "waypoints": [ { "lat": 61.4761, "lng": 23.7254 } ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let scenario = Scenario::from_json(SAMPLE).unwrap();
        assert_eq!(scenario.seed, Some(7));
        assert_eq!(scenario.strategy, Strategy::Cautious);
        assert_eq!(scenario.entities.len(), 2);
        assert_eq!(scenario.entities[0].kind, EntityKind::monster(Species::VoidWalker));
        assert!(matches!(
            scenario.entities[1].kind,
            EntityKind::Poi {
                site: PoiSite::AncientRuins,
                ..
            }
        ));
    }

    #[test]
    fn test_build_game_applies_overrides() {
        let scenario = Scenario::from_json(SAMPLE).unwrap();
        let game = scenario.build_game(None);
        assert_eq!(game.balance(), 120);
        assert_eq!(game.world().len(), 2);
    }

    #[test]
    fn test_invalid_waypoint_rejected() {
        let result = Scenario::from_json(r#"{"waypoints": [{"lat": 91.0, "lng": 0.0}]}"#);
        assert!(matches!(result, Err(ScenarioError::InvalidPosition { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result =
            Scenario::from_json(r#"{"config": {"scan_interval_ms": 0}, "waypoints": []}"#);
        assert!(matches!(result, Err(ScenarioError::Config(_))));
    }

    #[test]
    fn test_player_over_max_health_rejected() {
        let result = Scenario::from_json(r#"{"player": {"health": 150}, "waypoints": []}"#);
        let err = result.unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidPlayer(_)));
        assert!(err.to_string().contains("health 150 outside 0..=100"));
    }

    #[test]
    fn test_player_bad_sanity_and_level_rejected() {
        let result = Scenario::from_json(
            r#"{"player": {"sanity": 140, "level": 0}, "waypoints": []}"#,
        );
        let Err(ScenarioError::InvalidPlayer(reason)) = result else {
            panic!("expected an invalid player");
        };
        assert!(reason.contains("sanity 140"));
        assert!(reason.contains("level 0"));
    }

    #[test]
    fn test_monster_with_dead_stats_rejected() {
        let result = Scenario::from_json(
            r#"{
                "entities": [{
                    "position": { "lat": 61.4761, "lng": 23.7255 },
                    "kind": "monster",
                    "species": "void_walker",
                    "stats": { "health": -5, "attack": 1, "defense": 1, "luck": 1 }
                }],
                "waypoints": []
            }"#,
        );
        assert!(matches!(
            result,
            Err(ScenarioError::InvalidStats { health: -5, .. })
        ));
    }

    #[test]
    fn test_valid_player_override_accepted() {
        let scenario =
            Scenario::from_json(r#"{"player": {"health": 40, "attack": 7}, "waypoints": []}"#)
                .unwrap();
        let game = scenario.build_game(None);
        assert_eq!(game.player().health, 40);
        assert!(game.check_invariants().is_empty());
    }

    #[test]
    fn test_missing_waypoints_is_parse_error() {
        let result = Scenario::from_json("{}");
        assert!(matches!(result, Err(ScenarioError::Parse(_))));
    }
}
