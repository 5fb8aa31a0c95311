//! Turn-based dice combat between the player and one monster.
//!
//! ```text
//! Init ──► Initiative ──► PlayerTurn ◄──► MonsterTurn
//!   │                         │               │
//!   └──(ambush)──► MonsterTurn └──► Resolved ◄─┘
//! ```
//!
//! Every contest is `1d20 + modifier` against `1d20 + modifier`, and only a
//! strictly higher total wins: ties go to the defender. The one exception is
//! initiative, where a tie goes to the player.
//!
//! The engine never touches the step wallet. Callers charge for an action
//! before calling [`BattleState::player_action`], so a rejected action rolls
//! no dice.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EncounterConfig;
use crate::dice::{Dice, Roll};
use crate::player::CombatStats;
use crate::world::StatBlock;

/// Die used for every contest.
const D20: u32 = 20;
/// Player damage die.
const PLAYER_DAMAGE_DIE: u32 = 8;
/// Monster damage die.
const MONSTER_DAMAGE_DIE: u32 = 6;
/// Monster damage die against a defending player.
const DEFENDED_DAMAGE_DIE: u32 = 3;

/// Side of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Combatant {
    /// The player.
    Player,
    /// The monster.
    Monster,
}

/// What the player can do on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatAction {
    /// Contest attack against defense; a hit deals `1d8 + attack`.
    Attack,
    /// Brace for the next monster turn.
    Defend,
    /// Try to escape: `1d20 + luck` against `1d20 + flee resistance`.
    Flee,
}

impl fmt::Display for CombatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CombatAction::Attack => "attack",
            CombatAction::Defend => "defend",
            CombatAction::Flee => "flee",
        };
        f.write_str(label)
    }
}

/// Terminal battle result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatOutcome {
    /// Monster health reached zero.
    Victory,
    /// Player health reached zero.
    Defeat,
    /// The player escaped.
    Fled,
}

impl fmt::Display for CombatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CombatOutcome::Victory => "victory",
            CombatOutcome::Defeat => "defeat",
            CombatOutcome::Fled => "fled",
        };
        f.write_str(label)
    }
}

/// Where a battle is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BattlePhase {
    /// Created, nothing rolled yet.
    Init,
    /// Rolling for who goes first.
    Initiative,
    /// Waiting for a player action.
    PlayerTurn,
    /// The monster is acting.
    MonsterTurn,
    /// Finished.
    Resolved(CombatOutcome),
}

/// Numeric rules that come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatRules {
    /// Modifier on the monster's flee-resistance roll.
    pub flee_resistance: i32,
    /// Defense bonus while the player is defending.
    pub defend_bonus: i32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self::from_config(&EncounterConfig::default())
    }
}

impl CombatRules {
    /// Rules taken from a config.
    #[must_use]
    pub const fn from_config(config: &EncounterConfig) -> Self {
        Self {
            flee_resistance: config.flee_resistance,
            defend_bonus: config.defend_bonus,
        }
    }
}

/// Both sides' modifiers for one battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fighters {
    /// Player modifiers.
    pub player: CombatStats,
    /// Monster stat block.
    pub monster: StatBlock,
}

/// One resolved step of a battle, for the combat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnEvent {
    /// Who acts first.
    Initiative {
        /// Player roll.
        player: Roll,
        /// Monster roll.
        monster: Roll,
        /// Winner of the roll-off.
        first: Combatant,
    },
    /// The player attacked.
    PlayerAttack {
        /// Player attack roll.
        attack: Roll,
        /// Monster defense roll.
        defense: Roll,
        /// Damage dealt on a hit.
        damage: Option<i32>,
        /// Monster health afterwards.
        monster_health: i32,
    },
    /// The player braced.
    Defend,
    /// The player tried to escape.
    FleeAttempt {
        /// Player escape roll.
        escape: Roll,
        /// Monster resistance roll.
        resistance: Roll,
        /// Whether the escape worked.
        escaped: bool,
    },
    /// The monster attacked.
    MonsterAttack {
        /// Monster attack roll.
        attack: Roll,
        /// Player defense roll.
        defense: Roll,
        /// Whether the player was defending.
        defended: bool,
        /// Damage dealt on a hit.
        damage: Option<i32>,
        /// Player health afterwards.
        player_health: i32,
    },
    /// The battle ended.
    Resolved(CombatOutcome),
}

impl TurnEvent {
    /// One log line, naming the monster.
    #[must_use]
    pub fn describe(&self, monster: &str) -> String {
        match self {
            TurnEvent::Initiative {
                player,
                monster: theirs,
                first,
            } => {
                let who = match first {
                    Combatant::Player => "You act first",
                    Combatant::Monster => "The monster acts first",
                };
                format!("Initiative: you {player} vs {monster} {theirs}. {who}.")
            }
            TurnEvent::PlayerAttack {
                attack,
                defense,
                damage: Some(damage),
                monster_health,
            } => format!(
                "You attack: {attack} vs {defense}. Hit for {damage}! {monster} has {monster_health} HP left."
            ),
            TurnEvent::PlayerAttack {
                attack, defense, ..
            } => format!("You attack: {attack} vs {defense}. {monster} evades."),
            TurnEvent::Defend => "You brace yourself.".to_string(),
            TurnEvent::FleeAttempt {
                escape,
                resistance,
                escaped: true,
            } => format!("You flee: {escape} vs {resistance}. You escape!"),
            TurnEvent::FleeAttempt {
                escape, resistance, ..
            } => format!("You flee: {escape} vs {resistance}. {monster} blocks your escape!"),
            TurnEvent::MonsterAttack {
                attack,
                defense,
                damage: Some(damage),
                player_health,
                ..
            } => format!(
                "{monster} attacks: {attack} vs {defense}. You take {damage} damage, {player_health} HP left."
            ),
            TurnEvent::MonsterAttack {
                attack,
                defense,
                defended,
                ..
            } => {
                let how = if *defended { "block" } else { "dodge" };
                format!("{monster} attacks: {attack} vs {defense}. You {how} it.")
            }
            TurnEvent::Resolved(CombatOutcome::Victory) => format!("{monster} is defeated!"),
            TurnEvent::Resolved(CombatOutcome::Defeat) => format!("{monster} has bested you."),
            TurnEvent::Resolved(CombatOutcome::Fled) => format!("You left {monster} behind."),
        }
    }
}

/// Action attempted outside the player's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotPlayerTurn {
    /// Phase the battle was in.
    pub phase: BattlePhase,
}

impl fmt::Display for NotPlayerTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not the player's turn (phase {:?})", self.phase)
    }
}

impl std::error::Error for NotPlayerTurn {}

/// Live battle numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BattleState {
    /// Player health inside this battle.
    pub player_health: i32,
    /// Monster health.
    pub monster_health: i32,
    /// Whether the next monster turn faces a braced player.
    pub player_defending: bool,
    phase: BattlePhase,
    rounds: u32,
}

impl BattleState {
    /// New battle in [`BattlePhase::Init`].
    #[must_use]
    pub const fn new(player_health: i32, monster: &StatBlock) -> Self {
        Self {
            player_health,
            monster_health: monster.health,
            player_defending: false,
            phase: BattlePhase::Init,
            rounds: 0,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Whose turn it is, or `None` outside of turns.
    #[must_use]
    pub const fn turn_owner(&self) -> Option<Combatant> {
        match self.phase {
            BattlePhase::PlayerTurn => Some(Combatant::Player),
            BattlePhase::MonsterTurn => Some(Combatant::Monster),
            _ => None,
        }
    }

    /// Final outcome once resolved.
    #[must_use]
    pub const fn outcome(&self) -> Option<CombatOutcome> {
        match self.phase {
            BattlePhase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Player actions taken so far.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Roll initiative and, if the monster wins it, play its first turn.
    ///
    /// Does nothing unless the battle is in [`BattlePhase::Init`].
    pub fn roll_initiative(
        &mut self,
        fighters: &Fighters,
        rules: &CombatRules,
        dice: &mut impl Dice,
    ) -> Vec<TurnEvent> {
        let mut log = Vec::new();
        if self.phase != BattlePhase::Init {
            return log;
        }
        self.phase = BattlePhase::Initiative;

        let player = dice.check(D20, fighters.player.luck);
        let monster = dice.check(D20, fighters.monster.luck);
        // Ties favor the player.
        let first = if monster.beats(&player) {
            Combatant::Monster
        } else {
            Combatant::Player
        };
        log.push(TurnEvent::Initiative {
            player,
            monster,
            first,
        });

        match first {
            Combatant::Player => self.phase = BattlePhase::PlayerTurn,
            Combatant::Monster => {
                self.phase = BattlePhase::MonsterTurn;
                self.monster_turn(fighters, rules, dice, &mut log);
            }
        }
        log
    }

    /// Skip initiative and open with a monster turn.
    ///
    /// Used when the player fails to slip away before the battle starts.
    /// Does nothing unless the battle is in [`BattlePhase::Init`].
    pub fn ambush(
        &mut self,
        fighters: &Fighters,
        rules: &CombatRules,
        dice: &mut impl Dice,
    ) -> Vec<TurnEvent> {
        let mut log = Vec::new();
        if self.phase != BattlePhase::Init {
            return log;
        }
        self.phase = BattlePhase::MonsterTurn;
        self.monster_turn(fighters, rules, dice, &mut log);
        log
    }

    /// Resolve a player action and, unless the battle ends, the monster's reply.
    ///
    /// # Errors
    ///
    /// Returns [`NotPlayerTurn`] if the battle is not waiting for the player.
    pub fn player_action(
        &mut self,
        action: CombatAction,
        fighters: &Fighters,
        rules: &CombatRules,
        dice: &mut impl Dice,
    ) -> Result<Vec<TurnEvent>, NotPlayerTurn> {
        if self.phase != BattlePhase::PlayerTurn {
            return Err(NotPlayerTurn { phase: self.phase });
        }
        self.rounds += 1;
        let mut log = Vec::new();

        match action {
            CombatAction::Attack => {
                let attack = dice.check(D20, fighters.player.attack);
                let defense = dice.check(D20, fighters.monster.defense);
                let damage = if attack.beats(&defense) {
                    let damage = dice.check(PLAYER_DAMAGE_DIE, fighters.player.attack).total.max(0);
                    self.monster_health = (self.monster_health - damage).max(0);
                    Some(damage)
                } else {
                    None
                };
                log.push(TurnEvent::PlayerAttack {
                    attack,
                    defense,
                    damage,
                    monster_health: self.monster_health,
                });
                if self.monster_health == 0 {
                    self.resolve(CombatOutcome::Victory, &mut log);
                    return Ok(log);
                }
            }
            CombatAction::Defend => {
                self.player_defending = true;
                log.push(TurnEvent::Defend);
            }
            CombatAction::Flee => {
                let escape = dice.check(D20, fighters.player.luck);
                let resistance = dice.check(D20, rules.flee_resistance);
                let escaped = escape.beats(&resistance);
                log.push(TurnEvent::FleeAttempt {
                    escape,
                    resistance,
                    escaped,
                });
                if escaped {
                    self.resolve(CombatOutcome::Fled, &mut log);
                    return Ok(log);
                }
            }
        }

        self.phase = BattlePhase::MonsterTurn;
        self.monster_turn(fighters, rules, dice, &mut log);
        Ok(log)
    }

    fn monster_turn(
        &mut self,
        fighters: &Fighters,
        rules: &CombatRules,
        dice: &mut impl Dice,
        log: &mut Vec<TurnEvent>,
    ) {
        let defended = self.player_defending;
        let bonus = if defended { rules.defend_bonus } else { 0 };

        let attack = dice.check(D20, fighters.monster.attack);
        let defense = dice.check(D20, fighters.player.defense.saturating_add(bonus));
        let damage = if attack.beats(&defense) {
            let die = if defended {
                DEFENDED_DAMAGE_DIE
            } else {
                MONSTER_DAMAGE_DIE
            };
            let damage = dice.check(die, fighters.monster.attack).total.max(0);
            self.player_health = (self.player_health - damage).max(0);
            Some(damage)
        } else {
            None
        };
        // Bracing lasts exactly one monster turn.
        self.player_defending = false;

        log.push(TurnEvent::MonsterAttack {
            attack,
            defense,
            defended,
            damage,
            player_health: self.player_health,
        });

        if self.player_health == 0 {
            self.resolve(CombatOutcome::Defeat, log);
        } else {
            self.phase = BattlePhase::PlayerTurn;
        }
    }

    fn resolve(&mut self, outcome: CombatOutcome, log: &mut Vec<TurnEvent>) {
        self.phase = BattlePhase::Resolved(outcome);
        self.player_defending = false;
        log.push(TurnEvent::Resolved(outcome));
    }
}
