//! Opens sessions for triggered entities and resolves the player's choices.
//!
//! The dispatcher owns the single session slot. Every choice is checked
//! against the open session and paid for before any die is rolled, so a
//! refused choice leaves the session, the wallet and the dice stream as they
//! were. Any choice that ends the encounter empties the slot in the same call.

use serde::Serialize;

use crate::combat::{BattleState, CombatAction, CombatOutcome, CombatRules, Fighters, TurnEvent};
use crate::config::EncounterConfig;
use crate::dice::Dice;
use crate::encounter::{
    Choice, EncounterError, EncounterKind, EncounterOutcome, EncounterSession, MonsterChoice,
    MysteryChoice, PoiChoice, RewardSummary, SessionStage,
};
use crate::ledger::{Credit, RewardLedger};
use crate::player::{LevelUp, MAX_SANITY, PlayerState};
use crate::world::{EntityId, PoiSite, Species, StatBlock, WorldEntity};

/// Experience for watching a monster instead of fighting it.
const OBSERVE_EXPERIENCE: u32 = 10;
/// Experience for solving a site puzzle.
const PUZZLE_EXPERIENCE: u32 = 40;
/// Consolation experience for a failed puzzle.
const PUZZLE_FAIL_EXPERIENCE: u32 = 10;
/// Experience for investigating a mystery zone.
const MYSTERY_EXPERIENCE: u32 = 25;
/// Item granted by sampling a point of interest.
const SAMPLE_ITEM: &str = "Mysterious Sample";
/// Sanity regained by meditating.
const MEDITATE_SANITY: i32 = 10;

/// Mutable game state a choice may touch.
#[derive(Debug)]
pub struct EncounterContext<'a, D> {
    /// Rules and payouts.
    pub config: &'a EncounterConfig,
    /// The player.
    pub player: &'a mut PlayerState,
    /// Wallet and reward totals.
    pub ledger: &'a mut RewardLedger,
    /// Dice source.
    pub dice: &'a mut D,
}

/// A finished encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Entity the encounter was about.
    pub entity: EntityId,
    /// Display name of the entity.
    pub name: String,
    /// How it ended.
    pub outcome: EncounterOutcome,
    /// What it paid out.
    pub rewards: RewardSummary,
    /// Level-ups earned from the payout.
    pub level_ups: Vec<LevelUp>,
}

/// Result of one accepted choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceResult {
    /// The choice that was made.
    pub choice: Choice,
    /// Steps it cost.
    pub spent: u32,
    /// Wallet balance after the choice and any payout.
    pub balance: u32,
    /// Narrative and combat log lines, in order.
    pub lines: Vec<String>,
    /// Set when the choice ended the encounter.
    pub resolution: Option<Resolution>,
}

/// Working state while one choice resolves.
#[derive(Debug, Default)]
struct Step {
    lines: Vec<String>,
    outcome: Option<EncounterOutcome>,
    rewards: RewardSummary,
    level_ups: Vec<LevelUp>,
}

/// Holds at most one open [`EncounterSession`].
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    session: Option<EncounterSession>,
    opened: u64,
    resolved: u64,
}

impl Dispatcher {
    /// Dispatcher with no open session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The open session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&EncounterSession> {
        self.session.as_ref()
    }

    /// Whether a session is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Sessions opened and sessions ended so far.
    #[must_use]
    pub const fn counts(&self) -> (u64, u64) {
        (self.opened, self.resolved)
    }

    /// Open a session for a triggered entity.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::SessionActive`] when a session is already
    /// open. The new trigger is dropped, not queued.
    pub fn open(&mut self, entity: &WorldEntity) -> Result<&EncounterSession, EncounterError> {
        if let Some(active) = &self.session {
            log::debug!(
                "trigger for {} dropped: {} still in progress",
                entity.id,
                active.entity()
            );
            return Err(EncounterError::SessionActive {
                active: active.entity(),
            });
        }
        let session = EncounterSession::new(entity);
        log::info!("encounter opened: {} ({})", entity.id, entity.name());
        self.opened += 1;
        Ok(self.session.insert(session))
    }

    /// Resolve one choice in the open session.
    ///
    /// # Errors
    ///
    /// - [`EncounterError::NoActiveSession`] when nothing is open.
    /// - [`EncounterError::ChoiceNotOffered`] when the session does not offer
    ///   `choice` in its current stage.
    /// - [`EncounterError::InsufficientSteps`] when the wallet cannot pay.
    ///
    /// On error nothing has changed and no dice were rolled.
    pub fn choose<D: Dice>(
        &mut self,
        choice: Choice,
        ctx: &mut EncounterContext<'_, D>,
    ) -> Result<ChoiceResult, EncounterError> {
        let Some(session) = self.session.as_mut() else {
            return Err(EncounterError::NoActiveSession);
        };
        if !session.offers(choice) {
            return Err(EncounterError::ChoiceNotOffered { choice });
        }
        let spent = choice.cost(&ctx.config.costs);
        ctx.ledger.spend(spent)?;
        session.steps_spent = session.steps_spent.saturating_add(spent);

        let mut step = Step::default();
        match choice {
            Choice::Monster(monster) => monster_intro(session, monster, ctx, &mut step),
            Choice::Combat(action) => battle_turn(session, action, ctx, &mut step),
            Choice::Poi(poi) => point_of_interest(session, poi, ctx, &mut step),
            Choice::Mystery(mystery) => mystery_zone(session, mystery, ctx, &mut step),
        }

        let resolution = match step.outcome {
            Some(outcome) => self.finish(outcome, step.rewards, step.level_ups),
            None => None,
        };
        Ok(ChoiceResult {
            choice,
            spent,
            balance: ctx.ledger.balance(),
            lines: step.lines,
            resolution,
        })
    }

    /// End the open session without resolving it. Pays nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::NoActiveSession`] when nothing is open.
    pub fn close(&mut self) -> Result<Resolution, EncounterError> {
        self.finish(EncounterOutcome::Abandoned, RewardSummary::default(), Vec::new())
            .ok_or(EncounterError::NoActiveSession)
    }

    fn finish(
        &mut self,
        outcome: EncounterOutcome,
        rewards: RewardSummary,
        level_ups: Vec<LevelUp>,
    ) -> Option<Resolution> {
        let session = self.session.take()?;
        self.resolved += 1;
        log::info!("encounter closed: {} ({outcome})", session.entity());
        Some(Resolution {
            entity: session.entity(),
            name: session.kind().name().to_string(),
            outcome,
            rewards,
            level_ups,
        })
    }
}

fn monster_of(session: &EncounterSession) -> Option<(Species, StatBlock)> {
    match session.kind() {
        EncounterKind::Monster { species, stats } => Some((*species, *stats)),
        _ => None,
    }
}

fn monster_intro<D: Dice>(
    session: &mut EncounterSession,
    choice: MonsterChoice,
    ctx: &mut EncounterContext<'_, D>,
    step: &mut Step,
) {
    let Some((species, stats)) = monster_of(session) else {
        return;
    };
    let fighters = Fighters {
        player: ctx.player.combat_stats(),
        monster: stats,
    };
    let rules = CombatRules::from_config(ctx.config);

    match choice {
        MonsterChoice::Fight => {
            let mut battle = BattleState::new(ctx.player.health, &stats);
            let log = battle.roll_initiative(&fighters, &rules, ctx.dice);
            settle_battle(&battle, species, &log, ctx, step);
            session.stage = SessionStage::Battle(battle);
        }
        MonsterChoice::Flee => {
            let escape = ctx.dice.check(20, fighters.player.luck);
            let resistance = ctx.dice.check(20, rules.flee_resistance);
            let escaped = escape.beats(&resistance);
            let attempt = TurnEvent::FleeAttempt {
                escape,
                resistance,
                escaped,
            };
            step.lines.push(attempt.describe(species.name()));
            if escaped {
                step.outcome = Some(EncounterOutcome::Combat(CombatOutcome::Fled));
                return;
            }
            let mut battle = BattleState::new(ctx.player.health, &stats);
            let log = battle.ambush(&fighters, &rules, ctx.dice);
            settle_battle(&battle, species, &log, ctx, step);
            session.stage = SessionStage::Battle(battle);
        }
        MonsterChoice::Observe => {
            step.lines
                .push(format!("You study the {species} from a safe distance."));
            award_experience(OBSERVE_EXPERIENCE, ctx, step);
            step.outcome = Some(EncounterOutcome::Observed);
        }
    }
}

fn battle_turn<D: Dice>(
    session: &mut EncounterSession,
    action: CombatAction,
    ctx: &mut EncounterContext<'_, D>,
    step: &mut Step,
) {
    let Some((species, stats)) = monster_of(session) else {
        return;
    };
    let SessionStage::Battle(battle) = &mut session.stage else {
        return;
    };
    let fighters = Fighters {
        player: ctx.player.combat_stats(),
        monster: stats,
    };
    let rules = CombatRules::from_config(ctx.config);
    match battle.player_action(action, &fighters, &rules, ctx.dice) {
        Ok(log) => settle_battle(battle, species, &log, ctx, step),
        Err(e) => log::warn!("{action} ignored: {e}"),
    }
}

/// Copy battle results back onto the player and pay out if the battle ended.
fn settle_battle<D: Dice>(
    battle: &BattleState,
    species: Species,
    log: &[TurnEvent],
    ctx: &mut EncounterContext<'_, D>,
    step: &mut Step,
) {
    step.lines
        .extend(log.iter().map(|event| event.describe(species.name())));
    ctx.player.set_health(battle.player_health);

    let Some(outcome) = battle.outcome() else {
        return;
    };
    match outcome {
        CombatOutcome::Victory => {
            let range = ctx.config.victory_steps;
            let steps = ctx.dice.range(range.min, range.max);
            ctx.ledger.credit(Credit::Steps(steps));
            step.rewards.steps = step.rewards.steps.saturating_add(steps);

            let range = ctx.config.victory_experience;
            let experience = ctx.dice.range(range.min, range.max);
            award_experience(experience, ctx, step);

            for item in species.loot() {
                award_item(item, ctx, step);
            }
        }
        CombatOutcome::Defeat => {
            ctx.player.restore_fraction(ctx.config.defeat_restore_ratio);
            step.rewards.health_restored = Some(ctx.player.health);
            step.lines.push(format!(
                "You come to, bruised, with {} HP.",
                ctx.player.health
            ));
        }
        CombatOutcome::Fled => {}
    }
    step.outcome = Some(EncounterOutcome::Combat(outcome));
}

fn point_of_interest<D: Dice>(
    session: &EncounterSession,
    choice: PoiChoice,
    ctx: &mut EncounterContext<'_, D>,
    step: &mut Step,
) {
    let EncounterKind::Poi { site, .. } = session.kind() else {
        return;
    };
    let site = *site;

    let outcome = match choice {
        PoiChoice::Investigate => {
            let roll = ctx.dice.check(20, ctx.player.luck);
            let success = roll.total > ctx.config.puzzle_dc;
            if success {
                step.lines.push(format!(
                    "Puzzle: {roll} vs DC {}. The {site} yields its secret.",
                    ctx.config.puzzle_dc
                ));
                let item = pick_loot(site, ctx.dice);
                award_item(item, ctx, step);
                award_discovery(site.name(), ctx, step);
                award_experience(PUZZLE_EXPERIENCE, ctx, step);
            } else {
                step.lines.push(format!(
                    "Puzzle: {roll} vs DC {}. The mechanism will not budge.",
                    ctx.config.puzzle_dc
                ));
                award_experience(PUZZLE_FAIL_EXPERIENCE, ctx, step);
            }
            EncounterOutcome::Investigated { success }
        }
        PoiChoice::Sample => {
            step.lines.push(format!("You take a sample from the {site}."));
            award_item(SAMPLE_ITEM, ctx, step);
            EncounterOutcome::Sampled
        }
        PoiChoice::Leave => EncounterOutcome::Left,
    };
    step.outcome = Some(outcome);
}

fn pick_loot(site: PoiSite, dice: &mut impl Dice) -> &'static str {
    let loot = site.loot();
    let index = usize::try_from(dice.range(0, 3)).unwrap_or(0);
    loot.get(index).copied().unwrap_or_default()
}

fn mystery_zone<D: Dice>(
    session: &EncounterSession,
    choice: MysteryChoice,
    ctx: &mut EncounterContext<'_, D>,
    step: &mut Step,
) {
    let EncounterKind::Mystery { name } = session.kind() else {
        return;
    };

    let outcome = match choice {
        MysteryChoice::Investigate => {
            award_discovery(name, ctx, step);
            award_experience(MYSTERY_EXPERIENCE, ctx, step);

            let loss = ctx.dice.check(6, 2).total;
            let sanity = ctx.player.lose_sanity(loss);
            step.rewards.sanity_lost = step.rewards.sanity_lost.saturating_add(loss);
            step.lines.push(format!(
                "Something in {name} looks back. You lose {loss} sanity ({sanity} left)."
            ));
            if sanity == 0 {
                let restored = ctx.player.restore_sanity(MAX_SANITY / 2);
                step.rewards.sanity_restored = restored;
                step.lines
                    .push(format!("Your mind breaks, then slowly mends ({restored} sanity)."));
                EncounterOutcome::Overwhelmed
            } else {
                EncounterOutcome::Investigated { success: true }
            }
        }
        MysteryChoice::Meditate => {
            let before = ctx.player.sanity;
            let after = ctx.player.restore_sanity(MEDITATE_SANITY);
            step.rewards.sanity_restored = after - before;
            step.lines
                .push(format!("You meditate at the edge of {name} ({after} sanity)."));
            EncounterOutcome::Meditated
        }
        MysteryChoice::Leave => EncounterOutcome::Left,
    };
    step.outcome = Some(outcome);
}

fn award_experience<D: Dice>(amount: u32, ctx: &mut EncounterContext<'_, D>, step: &mut Step) {
    ctx.ledger.credit(Credit::Experience(amount));
    step.rewards.experience = step.rewards.experience.saturating_add(amount);
    let gained = ctx.player.gain_experience(u64::from(amount), ctx.dice);
    step.level_ups.extend(gained);
}

fn award_item<D>(item: &str, ctx: &mut EncounterContext<'_, D>, step: &mut Step) {
    ctx.player.collect([item]);
    ctx.ledger.credit(Credit::Item(item.to_string()));
    step.rewards.items.push(item.to_string());
}

fn award_discovery<D>(name: &str, ctx: &mut EncounterContext<'_, D>, step: &mut Step) {
    ctx.ledger.credit(Credit::Discovery(name.to_string()));
    step.rewards.discoveries.push(name.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::BattlePhase;
    use crate::dice::ScriptedDice;
    use crate::geo::GeoPoint;
    use crate::world::{EntityKind, EntityProvider, Rarity, World};

    struct Fixture {
        config: EncounterConfig,
        player: PlayerState,
        ledger: RewardLedger,
        dice: ScriptedDice,
        dispatcher: Dispatcher,
    }

    impl Fixture {
        fn new(kind: EntityKind, steps: u32, faces: &[u32]) -> Self {
            let mut world = World::new();
            let id = world.spawn(GeoPoint::new(0.0, 0.0), kind);
            let mut dispatcher = Dispatcher::new();
            dispatcher.open(world.entity(id).unwrap()).unwrap();
            Self {
                config: EncounterConfig::default(),
                player: PlayerState::default(),
                ledger: RewardLedger::with_balance(steps),
                dice: ScriptedDice::new(faces.iter().copied()),
                dispatcher,
            }
        }

        fn choose(&mut self, choice: Choice) -> Result<ChoiceResult, EncounterError> {
            let mut ctx = EncounterContext {
                config: &self.config,
                player: &mut self.player,
                ledger: &mut self.ledger,
                dice: &mut self.dice,
            };
            self.dispatcher.choose(choice, &mut ctx)
        }
    }

    fn weak_monster() -> EntityKind {
        EntityKind::Monster {
            species: Species::EnergyPhantom,
            stats: Some(StatBlock {
                health: 5,
                attack: 1,
                defense: 1,
                luck: 1,
            }),
        }
    }

    #[test]
    fn test_second_open_rejected() {
        let mut world = World::new();
        let a = world.spawn(GeoPoint::new(0.0, 0.0), EntityKind::monster(Species::VoidWalker));
        let b = world.spawn(GeoPoint::new(0.0, 0.0), EntityKind::monster(Species::CosmicBeast));
        let mut dispatcher = Dispatcher::new();
        dispatcher.open(world.entity(a).unwrap()).unwrap();
        let err = dispatcher.open(world.entity(b).unwrap()).unwrap_err();
        assert_eq!(err, EncounterError::SessionActive { active: a });
        assert_eq!(dispatcher.session().map(EncounterSession::entity), Some(a));
        assert_eq!(dispatcher.counts(), (1, 0));
    }

    #[test]
    fn test_insufficient_steps_rolls_nothing() {
        let mut fx = Fixture::new(weak_monster(), 8, &[20, 1]);
        fx.choose(Choice::Monster(MonsterChoice::Fight)).unwrap();
        let rolled = fx.dice.consumed();

        let err = fx.choose(Choice::Combat(CombatAction::Attack)).unwrap_err();
        assert!(matches!(err, EncounterError::InsufficientSteps(_)));
        assert_eq!(fx.ledger.balance(), 8);
        assert_eq!(fx.dice.consumed(), rolled);
        assert!(fx.dispatcher.is_active());
    }

    #[test]
    fn test_choice_not_offered() {
        let mut fx = Fixture::new(weak_monster(), 100, &[]);
        let err = fx.choose(Choice::Poi(PoiChoice::Sample)).unwrap_err();
        assert!(matches!(err, EncounterError::ChoiceNotOffered { .. }));
        assert_eq!(fx.ledger.balance(), 100);
    }

    #[test]
    fn test_fight_to_victory_pays_out_and_releases() {
        // initiative 20+12 vs 1+1; attack 20+15 vs 1+1; damage 8+15
        // steps range face 1 -> 25; experience face 1 -> 20
        let mut fx = Fixture::new(weak_monster(), 10, &[20, 1, 20, 1, 8, 1, 1]);
        let fight = fx.choose(Choice::Monster(MonsterChoice::Fight)).unwrap();
        assert!(fight.resolution.is_none());

        let result = fx.choose(Choice::Combat(CombatAction::Attack)).unwrap();
        let resolution = result.resolution.unwrap();
        assert_eq!(resolution.outcome, EncounterOutcome::Combat(CombatOutcome::Victory));
        assert_eq!(resolution.rewards.steps, 25);
        assert_eq!(resolution.rewards.experience, 20);
        assert_eq!(resolution.rewards.items.len(), 3);
        assert_eq!(result.balance, 25);
        assert_eq!(fx.player.inventory.len(), 3);
        assert_eq!(fx.player.experience, 20);
        assert!(!fx.dispatcher.is_active());
        assert_eq!(fx.dispatcher.counts(), (1, 1));
    }

    #[test]
    fn test_defeat_restores_half_health() {
        let brute = EntityKind::Monster {
            species: Species::CosmicBeast,
            stats: Some(StatBlock {
                health: 80,
                attack: 200,
                defense: 1,
                luck: 50,
            }),
        };
        // monster wins initiative and hits for 1+200 on its first turn
        let mut fx = Fixture::new(brute, 0, &[1, 20, 20, 1, 1]);
        let result = fx.choose(Choice::Monster(MonsterChoice::Fight)).unwrap();
        let resolution = result.resolution.unwrap();
        assert_eq!(resolution.outcome, EncounterOutcome::Combat(CombatOutcome::Defeat));
        assert_eq!(fx.player.health, 50);
        assert_eq!(resolution.rewards.health_restored, Some(50));
        assert!(!fx.dispatcher.is_active());
    }

    #[test]
    fn test_intro_flee_failure_starts_with_monster_turn() {
        // escape 1+12 vs 20+10; monster attack 1+1 vs 20+10 misses
        let mut fx = Fixture::new(weak_monster(), 20, &[1, 20, 1, 20]);
        let result = fx.choose(Choice::Monster(MonsterChoice::Flee)).unwrap();
        assert!(result.resolution.is_none());
        assert_eq!(result.lines.len(), 2);
        let battle = fx.dispatcher.session().unwrap().battle().unwrap();
        assert_eq!(battle.phase(), BattlePhase::PlayerTurn);
        assert_eq!(fx.ledger.balance(), 0);
    }

    #[test]
    fn test_intro_flee_success() {
        let mut fx = Fixture::new(weak_monster(), 20, &[20, 1]);
        let result = fx.choose(Choice::Monster(MonsterChoice::Flee)).unwrap();
        assert_eq!(
            result.resolution.map(|r| r.outcome),
            Some(EncounterOutcome::Combat(CombatOutcome::Fled))
        );
    }

    #[test]
    fn test_observe_grants_experience() {
        let mut fx = Fixture::new(weak_monster(), 5, &[]);
        let result = fx.choose(Choice::Monster(MonsterChoice::Observe)).unwrap();
        let resolution = result.resolution.unwrap();
        assert_eq!(resolution.outcome, EncounterOutcome::Observed);
        assert_eq!(resolution.rewards.experience, 10);
        assert_eq!(fx.ledger.balance(), 0);
    }

    #[test]
    fn test_poi_puzzle_success() {
        let poi = EntityKind::Poi {
            site: PoiSite::AncientRuins,
            rarity: Rarity::Rare,
        };
        // 4 + 12 = 16 > 15; loot face 2 -> index 1
        let mut fx = Fixture::new(poi, 15, &[4, 2]);
        let result = fx.choose(Choice::Poi(PoiChoice::Investigate)).unwrap();
        let resolution = result.resolution.unwrap();
        assert_eq!(resolution.outcome, EncounterOutcome::Investigated { success: true });
        assert_eq!(resolution.rewards.items, vec!["Historical Knowledge".to_string()]);
        assert_eq!(resolution.rewards.discoveries, vec!["Ancient Ruins".to_string()]);
        assert_eq!(resolution.rewards.experience, 40);
    }

    #[test]
    fn test_poi_puzzle_tie_fails() {
        let poi = EntityKind::Poi {
            site: PoiSite::MysticShrine,
            rarity: Rarity::Common,
        };
        // 3 + 12 = 15, not above DC 15
        let mut fx = Fixture::new(poi, 15, &[3]);
        let result = fx.choose(Choice::Poi(PoiChoice::Investigate)).unwrap();
        let resolution = result.resolution.unwrap();
        assert_eq!(resolution.outcome, EncounterOutcome::Investigated { success: false });
        assert_eq!(resolution.rewards.experience, 10);
        assert!(resolution.rewards.items.is_empty());
    }

    #[test]
    fn test_mystery_overwhelms_at_zero_sanity() {
        let zone = EntityKind::MysteryZone {
            name: "Hollow Hill".into(),
        };
        let mut fx = Fixture::new(zone, 15, &[6]);
        fx.player.sanity = 5;
        let result = fx.choose(Choice::Mystery(MysteryChoice::Investigate)).unwrap();
        let resolution = result.resolution.unwrap();
        assert_eq!(resolution.outcome, EncounterOutcome::Overwhelmed);
        assert_eq!(resolution.rewards.sanity_lost, 8);
        assert_eq!(fx.player.sanity, 50);
    }

    #[test]
    fn test_meditate_caps_sanity() {
        let zone = EntityKind::MysteryZone {
            name: "Still Pond".into(),
        };
        let mut fx = Fixture::new(zone, 5, &[]);
        fx.player.sanity = 95;
        let result = fx.choose(Choice::Mystery(MysteryChoice::Meditate)).unwrap();
        assert_eq!(fx.player.sanity, 100);
        assert_eq!(result.resolution.unwrap().rewards.sanity_restored, 5);
    }

    #[test]
    fn test_close_abandons() {
        let mut fx = Fixture::new(weak_monster(), 0, &[]);
        let resolution = fx.dispatcher.close().unwrap();
        assert_eq!(resolution.outcome, EncounterOutcome::Abandoned);
        assert!(resolution.rewards.is_empty());
        assert_eq!(fx.dispatcher.close(), Err(EncounterError::NoActiveSession));
    }
}
