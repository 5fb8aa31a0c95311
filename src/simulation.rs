//! Headless play: autopilot strategies, scripted walks and duels.
//!
//! Used by the command-line harness and by tests to drive the engine end to
//! end without a presentation layer.

mod duel;
mod scenario;
mod strategy;

pub use duel::{DUEL_WALLET, DuelResult, run_duel};
pub use scenario::{DEFAULT_SEED, PlacedEntity, Scenario, ScenarioError};
pub use strategy::{Decision, Strategy};

use serde::Serialize;

use crate::dice::Dice;
use crate::encounter::{Choice, Resolution};
use crate::events::{EncounterEvent, EventSink};
use crate::game::Game;
use crate::ledger::LedgerSummary;
use crate::player::PlayerState;

/// Upper bound on autopilot decisions within one encounter.
pub const MAX_DECISIONS: u32 = 1_000;

/// One encounter as the autopilot played it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncounterRecord {
    /// How it ended.
    pub resolution: Resolution,
    /// Accepted choices, in order.
    pub choices: Vec<Choice>,
    /// Battle turns among those choices.
    pub combat_rounds: u32,
}

/// Answer the open encounter with `strategy` until it ends.
///
/// Returns `None` when no encounter is open. If the strategy gives up, a
/// choice is refused, or [`MAX_DECISIONS`] is reached, the encounter is
/// closed and reported as abandoned.
pub fn autopilot<D: Dice>(
    game: &mut Game<D>,
    strategy: Strategy,
    sink: &mut impl EventSink,
) -> Option<EncounterRecord> {
    game.session()?;
    let mut choices = Vec::new();
    let mut combat_rounds = 0;

    for _ in 0..MAX_DECISIONS {
        let session = game.session()?;
        let decision =
            strategy.decide(session, game.player(), game.balance(), &game.config().costs);
        let Decision::Choose(choice) = decision else {
            log::debug!("{strategy} autopilot gives up on {}", session.entity());
            break;
        };
        match game.choose(choice, sink) {
            Ok(result) => {
                choices.push(choice);
                if matches!(choice, Choice::Combat(_)) {
                    combat_rounds += 1;
                }
                if let Some(resolution) = result.resolution {
                    return Some(EncounterRecord {
                        resolution,
                        choices,
                        combat_rounds,
                    });
                }
            }
            Err(e) => {
                log::warn!("{strategy} autopilot choice {choice} refused: {e}");
                break;
            }
        }
    }

    let resolution = game.close(sink).ok()?;
    Some(EncounterRecord {
        resolution,
        choices,
        combat_rounds,
    })
}

/// Everything that happened on a scripted walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkReport {
    /// Dice seed used.
    pub seed: u64,
    /// Autopilot used.
    pub strategy: Strategy,
    /// Waypoints visited.
    pub waypoints: usize,
    /// Encounters, in order.
    pub encounters: Vec<EncounterRecord>,
    /// Full event log.
    pub events: Vec<EncounterEvent>,
    /// Final ledger totals.
    pub ledger: LedgerSummary,
    /// Final player state.
    pub player: PlayerState,
}

/// Replay a scenario: one position fix and one scan tick per waypoint, with
/// the scenario's strategy answering every encounter.
#[must_use]
pub fn run_scenario(scenario: &Scenario, seed: Option<u64>) -> WalkReport {
    let seed = seed.or(scenario.seed).unwrap_or(DEFAULT_SEED);
    let mut game = scenario.build_game(Some(seed));
    let interval = game.config().scan_interval_ms;

    let mut events = Vec::new();
    let mut encounters = Vec::new();
    let mut now_ms = 0u64;

    for point in &scenario.waypoints {
        game.update_position(*point, &mut events);
        game.tick(now_ms, point, &mut events);
        if let Some(record) = autopilot(&mut game, scenario.strategy, &mut events) {
            encounters.push(record);
        }
        now_ms = now_ms.saturating_add(interval);
    }

    log::info!(
        "walk finished: {} waypoints, {} encounters, {} steps left",
        scenario.waypoints.len(),
        encounters.len(),
        game.balance()
    );

    WalkReport {
        seed,
        strategy: scenario.strategy,
        waypoints: scenario.waypoints.len(),
        encounters,
        events,
        ledger: game.ledger().summarize(),
        player: game.player().clone(),
    }
}
