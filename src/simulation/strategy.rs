//! Autopilot strategies that answer encounters without a human.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::combat::CombatAction;
use crate::config::ActionCosts;
use crate::encounter::{
    Choice, EncounterSession, MonsterChoice, MysteryChoice, PoiChoice, SessionStage,
};
use crate::player::PlayerState;

/// Health fraction below which a cautious player braces.
const CAUTIOUS_DEFEND_BELOW: f64 = 0.4;
/// Health fraction below which a cautious player runs.
const CAUTIOUS_FLEE_BELOW: f64 = 0.2;
/// Sanity below which a cautious player meditates.
const CAUTIOUS_MEDITATE_BELOW: i32 = 50;

/// How the autopilot plays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Fight everything, attack every turn, investigate everything.
    #[default]
    Aggressive,
    /// Fight while healthy, defend when hurt, flee when nearly down.
    Cautious,
    /// Never fight: observe, sample and leave.
    Pacifist,
}

/// What the autopilot wants to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Make this choice.
    Choose(Choice),
    /// Walk away from the encounter.
    Close,
}

impl Strategy {
    /// Every strategy, for sweeps.
    pub const ALL: [Strategy; 3] = [Strategy::Aggressive, Strategy::Cautious, Strategy::Pacifist];

    /// Pick the next move in `session`.
    ///
    /// Falls back to the cheapest affordable offered choice when the
    /// preferred one costs more than `balance`, and to [`Decision::Close`]
    /// when nothing is affordable.
    #[must_use]
    pub fn decide(
        self,
        session: &EncounterSession,
        player: &PlayerState,
        balance: u32,
        costs: &ActionCosts,
    ) -> Decision {
        let offered = session.offered_choices();
        if offered.is_empty() {
            return Decision::Close;
        }
        let preferred = self.preferred(session, player);
        if offered.contains(&preferred) && preferred.cost(costs) <= balance {
            return Decision::Choose(preferred);
        }
        offered
            .into_iter()
            .filter(|choice| choice.cost(costs) <= balance)
            .min_by_key(|choice| choice.cost(costs))
            .map_or(Decision::Close, Decision::Choose)
    }

    fn preferred(self, session: &EncounterSession, player: &PlayerState) -> Choice {
        let health = health_fraction(player);
        match (self, session.stage()) {
            (Strategy::Aggressive, SessionStage::MonsterIntro) => {
                Choice::Monster(MonsterChoice::Fight)
            }
            (Strategy::Cautious, SessionStage::MonsterIntro) => {
                if health < CAUTIOUS_DEFEND_BELOW {
                    Choice::Monster(MonsterChoice::Flee)
                } else {
                    Choice::Monster(MonsterChoice::Fight)
                }
            }
            (Strategy::Pacifist, SessionStage::MonsterIntro) => {
                Choice::Monster(MonsterChoice::Observe)
            }

            (Strategy::Aggressive, SessionStage::Battle(_)) => Choice::Combat(CombatAction::Attack),
            (Strategy::Cautious, SessionStage::Battle(_)) => {
                if health < CAUTIOUS_FLEE_BELOW {
                    Choice::Combat(CombatAction::Flee)
                } else if health < CAUTIOUS_DEFEND_BELOW {
                    Choice::Combat(CombatAction::Defend)
                } else {
                    Choice::Combat(CombatAction::Attack)
                }
            }
            (Strategy::Pacifist, SessionStage::Battle(_)) => Choice::Combat(CombatAction::Flee),

            (Strategy::Aggressive | Strategy::Cautious, SessionStage::PoiIntro) => {
                Choice::Poi(PoiChoice::Investigate)
            }
            (Strategy::Pacifist, SessionStage::PoiIntro) => Choice::Poi(PoiChoice::Sample),

            (Strategy::Aggressive, SessionStage::MysteryIntro) => {
                Choice::Mystery(MysteryChoice::Investigate)
            }
            (Strategy::Cautious, SessionStage::MysteryIntro) => {
                if player.sanity < CAUTIOUS_MEDITATE_BELOW {
                    Choice::Mystery(MysteryChoice::Meditate)
                } else {
                    Choice::Mystery(MysteryChoice::Investigate)
                }
            }
            (Strategy::Pacifist, SessionStage::MysteryIntro) => {
                Choice::Mystery(MysteryChoice::Leave)
            }
        }
    }
}

fn health_fraction(player: &PlayerState) -> f64 {
    if player.max_health <= 0 {
        return 0.0;
    }
    f64::from(player.health) / f64::from(player.max_health)
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Aggressive => "aggressive",
            Strategy::Cautious => "cautious",
            Strategy::Pacifist => "pacifist",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncounterConfig;
    use crate::dice::ScriptedDice;
    use crate::encounter::{Dispatcher, EncounterContext};
    use crate::geo::GeoPoint;
    use crate::ledger::RewardLedger;
    use crate::world::{EntityKind, EntityProvider, PoiSite, Rarity, Species, World};

    fn session(kind: EntityKind) -> EncounterSession {
        let mut world = World::new();
        let id = world.spawn(GeoPoint::new(0.0, 0.0), kind);
        EncounterSession::new(world.entity(id).unwrap())
    }

    fn battle_session() -> EncounterSession {
        let mut world = World::new();
        let id = world.spawn(GeoPoint::new(0.0, 0.0), EntityKind::monster(Species::VoidWalker));
        let mut dispatcher = Dispatcher::new();
        dispatcher.open(world.entity(id).unwrap()).unwrap();
        let config = EncounterConfig::default();
        let mut player = PlayerState::default();
        let mut ledger = RewardLedger::default();
        let mut dice = ScriptedDice::new([20, 1]);
        let mut ctx = EncounterContext {
            config: &config,
            player: &mut player,
            ledger: &mut ledger,
            dice: &mut dice,
        };
        dispatcher
            .choose(Choice::Monster(MonsterChoice::Fight), &mut ctx)
            .unwrap();
        dispatcher.session().unwrap().clone()
    }

    #[test]
    fn test_aggressive_attacks() {
        let battle = battle_session();
        assert!(battle.battle().is_some());
        let costs = ActionCosts::default();
        let decision = Strategy::Aggressive.decide(&battle, &PlayerState::default(), 100, &costs);
        assert_eq!(decision, Decision::Choose(Choice::Combat(CombatAction::Attack)));
    }

    #[test]
    fn test_cautious_defends_then_flees() {
        let battle = battle_session();
        let costs = ActionCosts::default();
        let hurt = PlayerState {
            health: 30,
            ..PlayerState::default()
        };
        assert_eq!(
            Strategy::Cautious.decide(&battle, &hurt, 100, &costs),
            Decision::Choose(Choice::Combat(CombatAction::Defend))
        );
        let dying = PlayerState {
            health: 10,
            ..PlayerState::default()
        };
        assert_eq!(
            Strategy::Cautious.decide(&battle, &dying, 100, &costs),
            Decision::Choose(Choice::Combat(CombatAction::Flee))
        );
    }

    #[test]
    fn test_falls_back_to_cheapest_affordable() {
        let battle = battle_session();
        let costs = ActionCosts::default();
        let decision = Strategy::Aggressive.decide(&battle, &PlayerState::default(), 7, &costs);
        assert_eq!(decision, Decision::Choose(Choice::Combat(CombatAction::Defend)));
    }

    #[test]
    fn test_closes_when_broke() {
        let battle = battle_session();
        let costs = ActionCosts::default();
        let decision = Strategy::Aggressive.decide(&battle, &PlayerState::default(), 2, &costs);
        assert_eq!(decision, Decision::Close);
    }

    #[test]
    fn test_pacifist_choices() {
        let costs = ActionCosts::default();
        let player = PlayerState::default();
        let monster = session(EntityKind::monster(Species::CosmicBeast));
        assert_eq!(
            Strategy::Pacifist.decide(&monster, &player, 5, &costs),
            Decision::Choose(Choice::Monster(MonsterChoice::Observe))
        );
        let poi = session(EntityKind::Poi {
            site: PoiSite::EnergyCrystal,
            rarity: Rarity::Common,
        });
        assert_eq!(
            Strategy::Pacifist.decide(&poi, &player, 0, &costs),
            Decision::Choose(Choice::Poi(PoiChoice::Leave))
        );
    }

    #[test]
    fn test_cautious_meditates_when_shaken() {
        let zone = session(EntityKind::MysteryZone {
            name: "Fog".into(),
        });
        let shaken = PlayerState {
            sanity: 30,
            ..PlayerState::default()
        };
        assert_eq!(
            Strategy::Cautious.decide(&zone, &shaken, 100, &ActionCosts::default()),
            Decision::Choose(Choice::Mystery(MysteryChoice::Meditate))
        );
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(Strategy::from_str("Cautious", true), Ok(Strategy::Cautious));
        assert!(Strategy::from_str("reckless", true).is_err());
        assert_eq!(Strategy::Pacifist.to_string(), "pacifist");
    }
}
