// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Eldritch: proximity-triggered encounters and dice combat for a
//! location-based game.
//!
//! The crate is the in-process core a map UI sits on top of:
//! - Deterministic: every random decision goes through a seeded [`Dice`] source
//! - Single writer: [`Game`] owns player, world, wallet and the open encounter
//! - Never fatal: anomalies degrade to a logged no-op or a user-visible message
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Simulation / autopilot (CLI)      │
//! ├─────────────────────────────────────┤
//! │   Game facade  ──►  EventSink       │
//! ├──────────────┬──────────────────────┤
//! │   Scanner    │   Dispatcher         │
//! │   (geo)      │   (combat, ledger)   │
//! ├──────────────┴──────────────────────┤
//! │   World arena      Player state     │
//! └─────────────────────────────────────┘
//! ```

pub mod combat;
pub mod config;
pub mod dice;
pub mod encounter;
pub mod events;
pub mod game;
pub mod geo;
pub mod invariants;
pub mod ledger;
pub mod player;
pub mod scanner;
pub mod simulation;
pub mod world;

pub use config::{ConfigError, EncounterConfig};
pub use dice::{Dice, Roll, ScriptedDice, SeededDice};
pub use encounter::{Choice, EncounterError, EncounterOutcome};
pub use events::{EncounterEvent, EventSink};
pub use game::Game;
pub use geo::{GeoPoint, PositionSource, haversine_distance};
pub use world::{EntityId, EntityKind, Species, World};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_cover_a_session() {
        let mut world = World::new();
        let id = world.spawn(
            GeoPoint::new(61.4761, 23.7255),
            EntityKind::monster(Species::VoidWalker),
        );
        let mut game = Game::new(EncounterConfig::default(), world, SeededDice::new(1));
        let mut events: Vec<EncounterEvent> = Vec::new();
        game.tick(0, &GeoPoint::new(61.4761, 23.7254), &mut events);
        assert_eq!(game.session().map(encounter::EncounterSession::entity), Some(id));
    }
}
