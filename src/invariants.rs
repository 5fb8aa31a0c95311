//! Game invariants - sanity checks that detect bugs.
//!
//! These should never fire in a correctly implemented engine. They are bug
//! detectors, not gameplay limits: terminal health or sanity is an expected
//! state, a negative one is not.

use crate::combat::BattleState;
use crate::dice::Dice;
use crate::encounter::{EncounterKind, EncounterSession};
use crate::game::Game;
use crate::player::{MAX_SANITY, PlayerState};
use crate::world::{EntityProvider, World};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(violations: &mut Vec<InvariantViolation>, message: String) {
    violations.push(InvariantViolation { message });
}

/// Check the player record on its own.
#[must_use]
pub fn check_player(player: &PlayerState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if player.max_health <= 0 {
        violation(
            &mut violations,
            format!("max health {} is not positive", player.max_health),
        );
    }
    if !(0..=player.max_health).contains(&player.health) {
        violation(
            &mut violations,
            format!("health {} outside 0..={}", player.health, player.max_health),
        );
    }
    if !(0..=MAX_SANITY).contains(&player.sanity) {
        violation(
            &mut violations,
            format!("sanity {} outside 0..={MAX_SANITY}", player.sanity),
        );
    }
    if player.level == 0 {
        violation(&mut violations, "level 0".to_string());
    }

    violations
}

fn check_battle(
    battle: &BattleState,
    monster_max: i32,
    player: &PlayerState,
    violations: &mut Vec<InvariantViolation>,
) {
    if !(0..=monster_max).contains(&battle.monster_health) {
        violation(
            violations,
            format!(
                "monster health {} outside 0..={monster_max}",
                battle.monster_health
            ),
        );
    }
    if battle.player_health != player.health {
        violation(
            violations,
            format!(
                "battle player health {} out of sync with player health {}",
                battle.player_health, player.health
            ),
        );
    }
    if battle.outcome().is_some() {
        violation(violations, "resolved battle still held in a session".to_string());
    }
}

fn check_session(
    session: &EncounterSession,
    world: &World,
    player: &PlayerState,
    violations: &mut Vec<InvariantViolation>,
) {
    match world.entity(session.entity()) {
        None => violation(
            violations,
            format!("session entity {} not in world", session.entity()),
        ),
        Some(entity) if !entity.encountered() => violation(
            violations,
            format!("session entity {} is not latched", session.entity()),
        ),
        Some(_) => {}
    }

    if let (Some(battle), EncounterKind::Monster { stats, .. }) =
        (session.battle(), session.kind())
    {
        check_battle(battle, stats.health, player, violations);
    }
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants<D: Dice>(game: &Game<D>) -> Vec<InvariantViolation> {
    let mut violations = check_player(game.player());

    let (opened, resolved) = game.dispatcher().counts();
    let open_now = u64::from(game.session().is_some());
    if opened != resolved + open_now {
        violation(
            &mut violations,
            format!("{opened} sessions opened, {resolved} resolved, {open_now} open"),
        );
    }

    if let Some(session) = game.session() {
        check_session(session, game.world(), game.player(), &mut violations);
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants<D: Dice>(game: &Game<D>) {
    let violations = check_invariants(game);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants<D: Dice>(_game: &Game<D>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncounterConfig;
    use crate::dice::ScriptedDice;
    use crate::geo::GeoPoint;
    use crate::world::{EntityKind, Species};

    fn create_valid_game() -> Game<ScriptedDice> {
        let mut world = World::new();
        world.spawn(GeoPoint::new(0.0, 0.0), EntityKind::monster(Species::VoidWalker));
        Game::new(EncounterConfig::default(), world, ScriptedDice::default())
    }

    #[test]
    fn test_valid_game_passes() {
        let game = create_valid_game();
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_health_overflow_detected() {
        let mut game = create_valid_game();
        game.player_mut().health = 101;

        let violations = check_invariants(&game);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("health"));
    }

    #[test]
    fn test_negative_sanity_detected() {
        let mut game = create_valid_game();
        game.player_mut().sanity = -1;

        let violations = check_invariants(&game);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("sanity"));
    }

    #[test]
    fn test_check_player_defaults() {
        assert!(check_player(&PlayerState::default()).is_empty());
        let broken = PlayerState {
            level: 0,
            max_health: 0,
            health: 0,
            ..PlayerState::default()
        };
        assert_eq!(check_player(&broken).len(), 2);
    }

    #[test]
    fn test_display() {
        let v = InvariantViolation {
            message: "sanity -1 outside 0..=100".into(),
        };
        assert_eq!(v.to_string(), "Invariant violation: sanity -1 outside 0..=100");
    }
}
