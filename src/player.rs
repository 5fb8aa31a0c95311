//! Player state: health, sanity, combat stats, experience and inventory.

use serde::{Deserialize, Serialize};

use crate::dice::Dice;

/// Upper bound for sanity.
pub const MAX_SANITY: i32 = 100;

/// The three numbers the combat engine needs from either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Added to attack and damage rolls.
    pub attack: i32,
    /// Added to defense rolls.
    pub defense: i32,
    /// Added to initiative and flee rolls.
    pub luck: i32,
}

/// Stat gains from a single level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    /// Level reached.
    pub level: u32,
    /// Max health gained.
    pub max_health: i32,
    /// Attack gained.
    pub attack: i32,
    /// Defense gained.
    pub defense: i32,
    /// Luck gained.
    pub luck: i32,
}

/// Mutable player record for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    /// Current health, `0..=max_health`.
    pub health: i32,
    /// Health ceiling.
    pub max_health: i32,
    /// Current sanity, `0..=MAX_SANITY`.
    pub sanity: i32,
    /// Attack modifier.
    pub attack: i32,
    /// Defense modifier.
    pub defense: i32,
    /// Luck modifier.
    pub luck: i32,
    /// Lifetime experience.
    pub experience: u64,
    /// Current level, starting at 1.
    pub level: u32,
    /// Items in pickup order.
    pub inventory: Vec<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            health: 100,
            max_health: 100,
            sanity: MAX_SANITY,
            attack: 15,
            defense: 10,
            luck: 12,
            experience: 0,
            level: 1,
            inventory: Vec::new(),
        }
    }
}

/// Experience needed to leave `level`: `floor(100 * level^1.5)`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn experience_for_level(level: u32) -> u64 {
    (100.0 * f64::from(level).powf(1.5)).floor() as u64
}

impl PlayerState {
    /// Combat modifiers.
    #[must_use]
    pub const fn combat_stats(&self) -> CombatStats {
        CombatStats {
            attack: self.attack,
            defense: self.defense,
            luck: self.luck,
        }
    }

    /// Whether health has run out.
    #[must_use]
    pub const fn is_down(&self) -> bool {
        self.health <= 0
    }

    /// Set health, clamped to `0..=max_health`.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    /// Restore health to `floor(max_health * ratio)`.
    pub fn restore_fraction(&mut self, ratio: f64) {
        #[allow(clippy::cast_possible_truncation)]
        let restored = (f64::from(self.max_health) * ratio).floor() as i32;
        self.set_health(restored);
    }

    /// Lose sanity, never dropping below zero. Returns the new value.
    pub fn lose_sanity(&mut self, amount: i32) -> i32 {
        self.sanity = self.sanity.saturating_sub(amount.max(0)).clamp(0, MAX_SANITY);
        self.sanity
    }

    /// Regain sanity, capped at [`MAX_SANITY`]. Returns the new value.
    pub fn restore_sanity(&mut self, amount: i32) -> i32 {
        self.sanity = self.sanity.saturating_add(amount.max(0)).clamp(0, MAX_SANITY);
        self.sanity
    }

    /// Append items to the inventory.
    pub fn collect<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inventory.extend(items.into_iter().map(Into::into));
    }

    /// Add experience and apply any level-ups it unlocks.
    ///
    /// Returns one entry per level gained, in order.
    pub fn gain_experience(&mut self, amount: u64, dice: &mut impl Dice) -> Vec<LevelUp> {
        self.experience = self.experience.saturating_add(amount);

        let mut gained = Vec::new();
        while self.experience >= experience_for_level(self.level) {
            gained.push(self.level_up(dice));
        }
        gained
    }

    fn level_up(&mut self, dice: &mut impl Dice) -> LevelUp {
        self.level += 1;

        let max_health = roll_gain(dice, 10, 4);
        let attack = roll_gain(dice, 3, 0);
        let defense = roll_gain(dice, 2, 0);
        let luck = roll_gain(dice, 2, 0);

        self.max_health += max_health;
        self.set_health(self.health + max_health / 2);
        self.attack += attack;
        self.defense += defense;
        self.luck += luck;

        log::info!("level up: now level {}", self.level);

        LevelUp {
            level: self.level,
            max_health,
            attack,
            defense,
            luck,
        }
    }
}

fn roll_gain(dice: &mut impl Dice, sides: u32, bonus: i32) -> i32 {
    dice.check(sides, bonus).total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{ScriptedDice, SeededDice};

    #[test]
    fn test_defaults() {
        let player = PlayerState::default();
        assert_eq!(player.health, 100);
        assert_eq!(player.max_health, 100);
        assert_eq!(player.sanity, 100);
        assert_eq!(player.level, 1);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_health_clamped() {
        let mut player = PlayerState::default();
        player.set_health(-20);
        assert_eq!(player.health, 0);
        assert!(player.is_down());
        player.set_health(500);
        assert_eq!(player.health, 100);
    }

    #[test]
    fn test_restore_fraction_floors() {
        let mut player = PlayerState {
            max_health: 107,
            health: 0,
            ..PlayerState::default()
        };
        player.restore_fraction(0.5);
        assert_eq!(player.health, 53);
    }

    #[test]
    fn test_sanity_bounds() {
        let mut player = PlayerState::default();
        assert_eq!(player.lose_sanity(130), 0);
        assert_eq!(player.restore_sanity(40), 40);
        assert_eq!(player.restore_sanity(500), 100);
    }

    #[test]
    fn test_experience_thresholds() {
        assert_eq!(experience_for_level(1), 100);
        assert_eq!(experience_for_level(2), 282);
        assert_eq!(experience_for_level(3), 519);
    }

    #[test]
    fn test_level_up_applies_rolled_gains() {
        let mut player = PlayerState {
            health: 80,
            ..PlayerState::default()
        };
        // max health d10 -> 6 (+4 = 10), attack d3 -> 2, defense d2 -> 1, luck d2 -> 2
        let mut dice = ScriptedDice::new([6, 2, 1, 2]);
        let gained = player.gain_experience(150, &mut dice);

        assert_eq!(gained.len(), 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.max_health, 110);
        assert_eq!(player.health, 85);
        assert_eq!(player.attack, 17);
        assert_eq!(player.defense, 11);
        assert_eq!(player.luck, 14);
    }

    #[test]
    fn test_large_credit_levels_multiple_times() {
        let mut player = PlayerState::default();
        let mut dice = SeededDice::new(3);
        let gained = player.gain_experience(600, &mut dice);
        assert_eq!(gained.len(), 3);
        assert_eq!(player.level, 4);
        assert!(player.health <= player.max_health);
    }

    #[test]
    fn test_below_threshold_no_level() {
        let mut player = PlayerState::default();
        let mut dice = ScriptedDice::default();
        assert!(player.gain_experience(99, &mut dice).is_empty());
        assert_eq!(dice.consumed(), 0);
    }
}
