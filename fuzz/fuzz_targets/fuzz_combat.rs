#![no_main]

use arbitrary::Arbitrary;
use eldritch::combat::{BattlePhase, BattleState, CombatAction, CombatRules, Fighters};
use eldritch::player::CombatStats;
use eldritch::world::StatBlock;
use eldritch::SeededDice;
use libfuzzer_sys::fuzz_target;

/// Structured input for combat fuzzing.
#[derive(Arbitrary, Debug)]
struct CombatInput {
    seed: u64,
    player_health: u8,
    player: (i8, i8, i8),
    monster_health: u8,
    monster: (i8, i8, i8),
    flee_resistance: i8,
    defend_bonus: i8,
    ambush: bool,
    /// Actions, two bits each.
    actions: Vec<u8>,
}

fuzz_target!(|input: CombatInput| {
    let player_health = i32::from(input.player_health).max(1);
    let fighters = Fighters {
        player: CombatStats {
            attack: i32::from(input.player.0),
            defense: i32::from(input.player.1),
            luck: i32::from(input.player.2),
        },
        monster: StatBlock {
            health: i32::from(input.monster_health).max(1),
            attack: i32::from(input.monster.0),
            defense: i32::from(input.monster.1),
            luck: i32::from(input.monster.2),
        },
    };
    let rules = CombatRules {
        flee_resistance: i32::from(input.flee_resistance),
        defend_bonus: i32::from(input.defend_bonus),
    };
    let mut dice = SeededDice::new(input.seed);
    let mut battle = BattleState::new(player_health, &fighters.monster);

    if input.ambush {
        battle.ambush(&fighters, &rules, &mut dice);
    } else {
        battle.roll_initiative(&fighters, &rules, &mut dice);
    }

    for &bits in input.actions.iter().take(1000) {
        let action = match bits % 3 {
            0 => CombatAction::Attack,
            1 => CombatAction::Defend,
            _ => CombatAction::Flee,
        };
        let (player_before, monster_before) = (battle.player_health, battle.monster_health);
        let rounds_before = battle.rounds();

        match battle.player_action(action, &fighters, &rules, &mut dice) {
            Ok(_) => assert_eq!(battle.rounds(), rounds_before + 1),
            Err(_) => {
                assert!(battle.outcome().is_some(), "refused outside a resolved battle");
                break;
            }
        }

        assert!(battle.player_health <= player_before);
        assert!(battle.monster_health <= monster_before);
        assert!((0..=player_health).contains(&battle.player_health));
        assert!((0..=fighters.monster.health).contains(&battle.monster_health));
        match battle.phase() {
            BattlePhase::PlayerTurn | BattlePhase::Resolved(_) => {}
            other => panic!("battle left in {other:?} after a player action"),
        }
    }
});
