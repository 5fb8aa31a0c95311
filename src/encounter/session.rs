//! The state of one open encounter.

use std::fmt;

use serde::Serialize;

use crate::combat::{BattlePhase, BattleState, CombatAction, CombatOutcome};
use crate::encounter::{Choice, MonsterChoice, MysteryChoice, PoiChoice};
use crate::world::{
    EntityCategory, EntityId, EntityKind, PoiSite, Rarity, Species, StatBlock, WorldEntity,
};

/// What the player ran into, with the data its flow needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EncounterKind {
    /// A monster, with its effective stats.
    Monster {
        /// Catalog species.
        species: Species,
        /// Stats used in battle.
        stats: StatBlock,
    },
    /// A point of interest.
    Poi {
        /// Catalog site.
        site: PoiSite,
        /// Display-only rarity.
        rarity: Rarity,
    },
    /// A mystery zone.
    Mystery {
        /// Zone name.
        name: String,
    },
}

impl EncounterKind {
    /// Build the encounter data for a world entity.
    #[must_use]
    pub fn for_entity(entity: &WorldEntity) -> Self {
        match &entity.kind {
            EntityKind::Monster { species, stats } => EncounterKind::Monster {
                species: *species,
                stats: stats.unwrap_or(species.stats()),
            },
            EntityKind::Poi { site, rarity } => EncounterKind::Poi {
                site: *site,
                rarity: *rarity,
            },
            EntityKind::MysteryZone { name } => EncounterKind::Mystery { name: name.clone() },
        }
    }

    /// Entity collection this kind of encounter comes from.
    #[must_use]
    pub const fn category(&self) -> EntityCategory {
        match self {
            EncounterKind::Monster { .. } => EntityCategory::Monster,
            EncounterKind::Poi { .. } => EntityCategory::Poi,
            EncounterKind::Mystery { .. } => EntityCategory::MysteryZone,
        }
    }

    /// Display name of the entity.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            EncounterKind::Monster { species, .. } => species.name(),
            EncounterKind::Poi { site, .. } => site.name(),
            EncounterKind::Mystery { name } => name,
        }
    }

    /// Opening narrative line.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            EncounterKind::Monster { species, .. } => format!("A {species} blocks your path!"),
            EncounterKind::Poi { site, rarity } => format!("You discovered {site} ({rarity})."),
            EncounterKind::Mystery { name } => format!("The air grows strange: {name}."),
        }
    }
}

/// Where an open session is in its flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStage {
    /// Monster intro: fight, flee or observe.
    MonsterIntro,
    /// A battle is running.
    Battle(BattleState),
    /// Point-of-interest intro.
    PoiIntro,
    /// Mystery zone intro.
    MysteryIntro,
}

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncounterOutcome {
    /// A battle (or intro flee) finished.
    Combat(CombatOutcome),
    /// The player watched the monster and left.
    Observed,
    /// A point of interest or mystery zone was investigated.
    Investigated {
        /// Whether a puzzle check succeeded. Mystery investigations always succeed.
        success: bool,
    },
    /// A sample was taken.
    Sampled,
    /// The player meditated.
    Meditated,
    /// The player walked away.
    Left,
    /// Sanity ran out during an investigation.
    Overwhelmed,
    /// The session was closed without resolving.
    Abandoned,
}

impl fmt::Display for EncounterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncounterOutcome::Combat(outcome) => write!(f, "{outcome}"),
            EncounterOutcome::Observed => f.write_str("observed"),
            EncounterOutcome::Investigated { success: true } => f.write_str("investigated"),
            EncounterOutcome::Investigated { success: false } => f.write_str("puzzle failed"),
            EncounterOutcome::Sampled => f.write_str("sampled"),
            EncounterOutcome::Meditated => f.write_str("meditated"),
            EncounterOutcome::Left => f.write_str("left"),
            EncounterOutcome::Overwhelmed => f.write_str("overwhelmed"),
            EncounterOutcome::Abandoned => f.write_str("abandoned"),
        }
    }
}

/// What one encounter paid out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RewardSummary {
    /// Steps credited.
    pub steps: u32,
    /// Experience credited.
    pub experience: u32,
    /// Items added to the inventory.
    pub items: Vec<String>,
    /// Discoveries recorded.
    pub discoveries: Vec<String>,
    /// Sanity lost.
    pub sanity_lost: i32,
    /// Sanity regained.
    pub sanity_restored: i32,
    /// Health after a respawn restore.
    pub health_restored: Option<i32>,
}

impl RewardSummary {
    /// Whether nothing was gained or lost.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The one open encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncounterSession {
    entity: EntityId,
    kind: EncounterKind,
    pub(crate) stage: SessionStage,
    pub(crate) steps_spent: u32,
}

impl EncounterSession {
    /// Open a session for a triggered entity.
    #[must_use]
    pub fn new(entity: &WorldEntity) -> Self {
        let kind = EncounterKind::for_entity(entity);
        let stage = match kind {
            EncounterKind::Monster { .. } => SessionStage::MonsterIntro,
            EncounterKind::Poi { .. } => SessionStage::PoiIntro,
            EncounterKind::Mystery { .. } => SessionStage::MysteryIntro,
        };
        Self {
            entity: entity.id,
            kind,
            stage,
            steps_spent: 0,
        }
    }

    /// Entity this session is about.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Encounter data.
    #[must_use]
    pub const fn kind(&self) -> &EncounterKind {
        &self.kind
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> &SessionStage {
        &self.stage
    }

    /// Running battle, if any.
    #[must_use]
    pub const fn battle(&self) -> Option<&BattleState> {
        match &self.stage {
            SessionStage::Battle(battle) => Some(battle),
            _ => None,
        }
    }

    /// Opening narrative line.
    #[must_use]
    pub fn title(&self) -> String {
        self.kind.title()
    }

    /// Steps spent inside this session so far.
    #[must_use]
    pub const fn steps_spent(&self) -> u32 {
        self.steps_spent
    }

    /// Choices available right now, in display order.
    #[must_use]
    pub fn offered_choices(&self) -> Vec<Choice> {
        match &self.stage {
            SessionStage::MonsterIntro => vec![
                Choice::Monster(MonsterChoice::Fight),
                Choice::Monster(MonsterChoice::Flee),
                Choice::Monster(MonsterChoice::Observe),
            ],
            SessionStage::Battle(battle) if battle.phase() == BattlePhase::PlayerTurn => vec![
                Choice::Combat(CombatAction::Attack),
                Choice::Combat(CombatAction::Defend),
                Choice::Combat(CombatAction::Flee),
            ],
            SessionStage::Battle(_) => Vec::new(),
            SessionStage::PoiIntro => vec![
                Choice::Poi(PoiChoice::Investigate),
                Choice::Poi(PoiChoice::Sample),
                Choice::Poi(PoiChoice::Leave),
            ],
            SessionStage::MysteryIntro => vec![
                Choice::Mystery(MysteryChoice::Investigate),
                Choice::Mystery(MysteryChoice::Meditate),
                Choice::Mystery(MysteryChoice::Leave),
            ],
        }
    }

    /// Whether `choice` is available right now.
    #[must_use]
    pub fn offers(&self, choice: Choice) -> bool {
        self.offered_choices().contains(&choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::world::{EntityProvider, World};

    fn open(kind: EntityKind) -> EncounterSession {
        let mut world = World::new();
        let id = world.spawn(GeoPoint::new(0.0, 0.0), kind);
        EncounterSession::new(world.entity(id).unwrap())
    }

    #[test]
    fn test_monster_session_offers_intro() {
        let session = open(EntityKind::monster(Species::ShadowStalker));
        assert_eq!(session.stage(), &SessionStage::MonsterIntro);
        assert!(session.offers(Choice::Monster(MonsterChoice::Observe)));
        assert!(!session.offers(Choice::Combat(CombatAction::Attack)));
        assert!(session.title().contains("Shadow Stalker"));
    }

    #[test]
    fn test_poi_session_offers_poi_choices() {
        let session = open(EntityKind::Poi {
            site: PoiSite::EnergyCrystal,
            rarity: Rarity::Uncommon,
        });
        assert_eq!(session.kind().category(), EntityCategory::Poi);
        assert_eq!(session.offered_choices().len(), 3);
        assert!(session.offers(Choice::Poi(PoiChoice::Sample)));
        assert!(!session.offers(Choice::Mystery(MysteryChoice::Leave)));
    }

    #[test]
    fn test_battle_outside_player_turn_offers_nothing() {
        let mut session = open(EntityKind::monster(Species::VoidWalker));
        session.stage = SessionStage::Battle(BattleState::new(100, &Species::VoidWalker.stats()));
        assert!(session.offered_choices().is_empty());
    }

    #[test]
    fn test_monster_stat_override_carried() {
        let custom = StatBlock {
            health: 1,
            attack: 1,
            defense: 1,
            luck: 1,
        };
        let session = open(EntityKind::Monster {
            species: Species::CosmicBeast,
            stats: Some(custom),
        });
        assert_eq!(
            session.kind(),
            &EncounterKind::Monster {
                species: Species::CosmicBeast,
                stats: custom
            }
        );
    }

    #[test]
    fn test_empty_reward_summary() {
        assert!(RewardSummary::default().is_empty());
        let summary = RewardSummary {
            steps: 1,
            ..RewardSummary::default()
        };
        assert!(!summary.is_empty());
    }
}
