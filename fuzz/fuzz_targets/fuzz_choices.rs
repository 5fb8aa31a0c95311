#![no_main]

use arbitrary::Arbitrary;
use eldritch::combat::CombatAction;
use eldritch::encounter::{MonsterChoice, MysteryChoice, PoiChoice};
use eldritch::world::{PoiSite, Rarity};
use eldritch::{
    Choice, EncounterConfig, EntityKind, Game, GeoPoint, SeededDice, Species, World,
};
use libfuzzer_sys::fuzz_target;

/// One thing the player can do.
#[derive(Arbitrary, Debug)]
enum Op {
    /// Move to an offset (in 1e-5 degree units) from the origin and tick.
    Walk { dlat: i16, dlng: i16 },
    /// Make one of the twelve choices.
    Choose(u8),
    /// Walk away from the open encounter.
    Close,
    /// Clear every latch.
    Reset,
}

/// Structured input for choice fuzzing.
#[derive(Arbitrary, Debug)]
struct ChoiceInput {
    seed: u64,
    starting_steps: u16,
    /// Entity offsets and kind selectors.
    entities: Vec<(i16, i16, u8)>,
    ops: Vec<Op>,
}

const ORIGIN: (f64, f64) = (61.4761, 23.7254);

fn offset(dlat: i16, dlng: i16) -> GeoPoint {
    GeoPoint::new(
        ORIGIN.0 + f64::from(dlat) * 1e-5,
        ORIGIN.1 + f64::from(dlng) * 1e-5,
    )
}

fn choice(selector: u8) -> Choice {
    match selector % 12 {
        0 => Choice::Monster(MonsterChoice::Fight),
        1 => Choice::Monster(MonsterChoice::Flee),
        2 => Choice::Monster(MonsterChoice::Observe),
        3 => Choice::Combat(CombatAction::Attack),
        4 => Choice::Combat(CombatAction::Defend),
        5 => Choice::Combat(CombatAction::Flee),
        6 => Choice::Poi(PoiChoice::Investigate),
        7 => Choice::Poi(PoiChoice::Sample),
        8 => Choice::Poi(PoiChoice::Leave),
        9 => Choice::Mystery(MysteryChoice::Investigate),
        10 => Choice::Mystery(MysteryChoice::Meditate),
        _ => Choice::Mystery(MysteryChoice::Leave),
    }
}

fn kind(selector: u8) -> EntityKind {
    match selector % 7 {
        n @ 0..=4 => EntityKind::monster(Species::ALL[usize::from(n)]),
        5 => EntityKind::Poi {
            site: PoiSite::EnergyCrystal,
            rarity: Rarity::Uncommon,
        },
        _ => EntityKind::MysteryZone {
            name: "Static Field".into(),
        },
    }
}

fuzz_target!(|input: ChoiceInput| {
    // Cap inputs to keep runs short
    if input.entities.len() > 64 || input.ops.len() > 512 {
        return;
    }

    let mut world = World::new();
    for &(dlat, dlng, selector) in &input.entities {
        world.spawn(offset(dlat, dlng), kind(selector));
    }
    let config = EncounterConfig {
        starting_steps: u32::from(input.starting_steps),
        ..EncounterConfig::default()
    };
    let mut game = Game::new(config, world, SeededDice::new(input.seed));
    let mut events = Vec::new();
    let mut now_ms = 0u64;

    for op in &input.ops {
        let balance = game.balance();
        match *op {
            Op::Walk { dlat, dlng } => {
                let position = offset(dlat, dlng);
                game.update_position(position, &mut events);
                game.tick(now_ms, &position, &mut events);
                now_ms += game.config().scan_interval_ms;
            }
            Op::Choose(selector) => {
                if game.choose(choice(selector), &mut events).is_err() {
                    assert_eq!(game.balance(), balance, "refused choice changed the wallet");
                }
            }
            Op::Close => {
                let _ = game.close(&mut events);
            }
            Op::Reset => {
                let open = game.session().is_some();
                assert_eq!(game.reset_encounters().is_err(), open);
            }
        }

        let violations = game.check_invariants();
        assert!(violations.is_empty(), "invariants violated after {op:?}: {violations:?}");
    }
});
