//! Choices the player can make inside an encounter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::CombatAction;
use crate::config::ActionCosts;

/// Monster intro choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterChoice {
    /// Roll initiative and start the battle.
    Fight,
    /// Try to slip away before the battle starts.
    Flee,
    /// Study the creature from a distance and leave.
    Observe,
}

/// Point-of-interest choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoiChoice {
    /// Attempt the site's puzzle.
    Investigate,
    /// Take a sample.
    Sample,
    /// Walk on.
    Leave,
}

/// Mystery zone choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MysteryChoice {
    /// Look into the anomaly at the cost of sanity.
    Investigate,
    /// Recover sanity.
    Meditate,
    /// Walk on.
    Leave,
}

/// Any choice the dispatcher can be asked to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    /// Monster intro.
    Monster(MonsterChoice),
    /// Point of interest.
    Poi(PoiChoice),
    /// Mystery zone.
    Mystery(MysteryChoice),
    /// Battle turn.
    Combat(CombatAction),
}

impl Choice {
    /// Step cost of this choice.
    #[must_use]
    pub const fn cost(self, costs: &ActionCosts) -> u32 {
        match self {
            Choice::Monster(MonsterChoice::Fight) => costs.fight,
            Choice::Monster(MonsterChoice::Observe) => costs.observe,
            Choice::Monster(MonsterChoice::Flee) | Choice::Combat(CombatAction::Flee) => costs.flee,
            Choice::Combat(CombatAction::Attack) => costs.attack,
            Choice::Combat(CombatAction::Defend) => costs.defend,
            Choice::Poi(PoiChoice::Investigate) | Choice::Mystery(MysteryChoice::Investigate) => {
                costs.investigate
            }
            Choice::Poi(PoiChoice::Sample) => costs.sample,
            Choice::Mystery(MysteryChoice::Meditate) => costs.meditate,
            Choice::Poi(PoiChoice::Leave) | Choice::Mystery(MysteryChoice::Leave) => costs.leave,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Choice::Monster(MonsterChoice::Fight) => "fight",
            Choice::Monster(MonsterChoice::Flee) => "flee",
            Choice::Monster(MonsterChoice::Observe) => "observe",
            Choice::Poi(PoiChoice::Investigate) | Choice::Mystery(MysteryChoice::Investigate) => {
                "investigate"
            }
            Choice::Poi(PoiChoice::Sample) => "sample",
            Choice::Poi(PoiChoice::Leave) | Choice::Mystery(MysteryChoice::Leave) => "leave",
            Choice::Mystery(MysteryChoice::Meditate) => "meditate",
            Choice::Combat(action) => return write!(f, "{action}"),
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_costs() {
        let costs = ActionCosts::default();
        assert_eq!(Choice::Combat(CombatAction::Attack).cost(&costs), 10);
        assert_eq!(Choice::Combat(CombatAction::Defend).cost(&costs), 5);
        assert_eq!(Choice::Combat(CombatAction::Flee).cost(&costs), 20);
        assert_eq!(Choice::Monster(MonsterChoice::Flee).cost(&costs), 20);
        assert_eq!(Choice::Monster(MonsterChoice::Fight).cost(&costs), 0);
        assert_eq!(Choice::Poi(PoiChoice::Leave).cost(&costs), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Choice::Combat(CombatAction::Defend).to_string(), "defend");
        assert_eq!(Choice::Mystery(MysteryChoice::Meditate).to_string(), "meditate");
    }
}
