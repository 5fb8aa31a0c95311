//! Dice sources.
//!
//! Every random decision in the engine goes through [`Dice`], so a game is
//! fully reproducible from its seed. [`SeededDice`] is the production source;
//! [`ScriptedDice`] replays a fixed list of faces for tests and demos.

use std::collections::VecDeque;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// A source of uniform die rolls.
pub trait Dice {
    /// Roll one die with `sides` faces, returning a value in `1..=sides`.
    ///
    /// A zero-sided die always returns 0.
    fn roll(&mut self, sides: u32) -> u32;

    /// Roll one die and add a signed modifier.
    fn check(&mut self, sides: u32, modifier: i32) -> Roll {
        Roll::new(self.roll(sides), modifier)
    }

    /// Uniform integer in the half-open range `[low, high)`.
    ///
    /// Implemented on top of [`Dice::roll`] so scripted sources stay in control.
    fn range(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        low + self.roll(high - low) - 1
    }
}

/// A single modified die roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Roll {
    /// The face that came up.
    pub natural: u32,
    /// Additive modifier applied to the face.
    pub modifier: i32,
    /// `natural + modifier`.
    pub total: i32,
}

impl Roll {
    /// Combine a face with a modifier.
    #[must_use]
    pub fn new(natural: u32, modifier: i32) -> Self {
        let face = i32::try_from(natural).unwrap_or(i32::MAX);
        Self {
            natural,
            modifier,
            total: face.saturating_add(modifier),
        }
    }

    /// Strictly beats `other`. Ties go to the other side.
    #[must_use]
    pub fn beats(&self, other: &Roll) -> bool {
        self.total > other.total
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            0 => write!(f, "{}", self.total),
            m if m > 0 => write!(f, "{} ({}+{m})", self.total, self.natural),
            m => write!(f, "{} ({}{m})", self.total, self.natural),
        }
    }
}

/// Deterministic dice backed by a seeded ChaCha8 stream.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    /// Create dice from a seed. The same seed always yields the same rolls.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rng.gen_range(1..=sides)
    }
}

/// Dice that replay a fixed sequence of faces.
///
/// Faces larger than the requested die are clamped to the die size. Once the
/// script runs out every roll returns 1, so a short script never panics.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    consumed: usize,
}

impl ScriptedDice {
    /// Create dice that will return `faces` in order.
    #[must_use]
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Append more faces to the end of the script.
    pub fn push(&mut self, faces: impl IntoIterator<Item = u32>) {
        self.faces.extend(faces);
    }

    /// Number of rolls made so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of scripted faces not yet used.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        self.consumed += 1;
        if sides == 0 {
            return 0;
        }
        self.faces.pop_front().unwrap_or(1).clamp(1, sides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_in_range() {
        let mut dice = SeededDice::new(7);
        for _ in 0..1000 {
            let face = dice.roll(20);
            assert!((1..=20).contains(&face));
        }
    }

    #[test]
    fn test_seeded_dice_deterministic() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        let rolls_a: Vec<_> = (0..50).map(|_| a.roll(8)).collect();
        let rolls_b: Vec<_> = (0..50).map(|_| b.roll(8)).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_zero_sided_die() {
        let mut dice = SeededDice::new(1);
        assert_eq!(dice.roll(0), 0);
    }

    #[test]
    fn test_scripted_dice_replays_and_clamps() {
        let mut dice = ScriptedDice::new([3, 25, 0]);
        assert_eq!(dice.roll(20), 3);
        assert_eq!(dice.roll(20), 20);
        assert_eq!(dice.roll(6), 1);
        // Exhausted
        assert_eq!(dice.roll(6), 1);
        assert_eq!(dice.consumed(), 4);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_range_half_open() {
        let mut dice = SeededDice::new(9);
        for _ in 0..1000 {
            let v = dice.range(25, 75);
            assert!((25..75).contains(&v));
        }
        let mut scripted = ScriptedDice::new([1, 50]);
        assert_eq!(scripted.range(25, 75), 25);
        assert_eq!(scripted.range(25, 75), 74);
        assert_eq!(scripted.range(10, 10), 10);
    }

    #[test]
    fn test_roll_total_and_ties() {
        let a = Roll::new(5, 10);
        let b = Roll::new(10, 5);
        assert_eq!(a.total, 15);
        assert!(!a.beats(&b));
        assert!(!b.beats(&a));
        assert!(Roll::new(6, 10).beats(&b));
    }

    #[test]
    fn test_roll_display() {
        assert_eq!(Roll::new(12, 3).to_string(), "15 (12+3)");
        assert_eq!(Roll::new(12, -2).to_string(), "10 (12-2)");
        assert_eq!(Roll::new(4, 0).to_string(), "4");
    }
}
