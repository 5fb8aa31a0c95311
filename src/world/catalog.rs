//! Static content: monster species and points of interest.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Combat numbers for a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Starting health for a battle.
    pub health: i32,
    /// Added to attack and damage rolls.
    pub attack: i32,
    /// Added to defense rolls.
    pub defense: i32,
    /// Added to initiative rolls.
    pub luck: i32,
}

/// Known monster species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    /// Hunts near the rifts. Balanced.
    ShadowStalker,
    /// Big and slow to hit back.
    CosmicBeast,
    /// Hard to pin down.
    VoidWalker,
    /// Fragile, hits hard, acts first.
    EnergyPhantom,
    /// A wall of crystal.
    CrystalGuardian,
}

impl Species {
    /// Every species, in catalog order.
    pub const ALL: [Species; 5] = [
        Species::ShadowStalker,
        Species::CosmicBeast,
        Species::VoidWalker,
        Species::EnergyPhantom,
        Species::CrystalGuardian,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Species::ShadowStalker => "Shadow Stalker",
            Species::CosmicBeast => "Cosmic Beast",
            Species::VoidWalker => "Void Walker",
            Species::EnergyPhantom => "Energy Phantom",
            Species::CrystalGuardian => "Crystal Guardian",
        }
    }

    /// Default stat block.
    #[must_use]
    pub const fn stats(self) -> StatBlock {
        match self {
            Species::ShadowStalker => StatBlock { health: 60, attack: 6, defense: 8, luck: 6 },
            Species::CosmicBeast => StatBlock { health: 80, attack: 8, defense: 6, luck: 4 },
            Species::VoidWalker => StatBlock { health: 50, attack: 7, defense: 10, luck: 8 },
            Species::EnergyPhantom => StatBlock { health: 40, attack: 9, defense: 5, luck: 10 },
            Species::CrystalGuardian => StatBlock { health: 100, attack: 5, defense: 14, luck: 2 },
        }
    }

    /// Items dropped on defeat. All three are awarded.
    #[must_use]
    pub const fn loot(self) -> [&'static str; 3] {
        match self {
            Species::ShadowStalker => ["Shadow Essence", "Void Crystal", "Dark Knowledge"],
            Species::CosmicBeast => ["Starlight Scale", "Cosmic Essence", "Dimensional Fragment"],
            Species::VoidWalker => ["Void Fragment", "Dimensional Tear", "Void Knowledge"],
            Species::EnergyPhantom => ["Energy Crystal", "Lightning Essence", "Power Fragment"],
            Species::CrystalGuardian => ["Crystal Shard", "Ancient Wisdom", "Guardian Essence"],
        }
    }

    /// Look up a species by display name or snake-case key, ignoring case.
    #[must_use]
    pub fn parse(input: &str) -> Option<Species> {
        let key: String = input
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Species::ALL.into_iter().find(|s| {
            let name: String = s
                .name()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect();
            name == key
        })
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Known kinds of point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiSite {
    /// Crumbling stones that still hum.
    AncientRuins,
    /// A crystal formation pulsing with energy.
    EnergyCrystal,
    /// A small shrine to an unknown deity.
    MysticShrine,
}

impl PoiSite {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PoiSite::AncientRuins => "Ancient Ruins",
            PoiSite::EnergyCrystal => "Energy Crystal",
            PoiSite::MysticShrine => "Mystic Shrine",
        }
    }

    /// Puzzle rewards. One is drawn at random on success.
    #[must_use]
    pub const fn loot(self) -> [&'static str; 3] {
        match self {
            PoiSite::AncientRuins => [
                "Ancient Artifact",
                "Historical Knowledge",
                "Mystical Insight",
            ],
            PoiSite::EnergyCrystal => ["Energy Fragment", "Cosmic Insight", "Power Crystal"],
            PoiSite::MysticShrine => ["Blessing", "Spiritual Insight", "Mystical Fragment"],
        }
    }
}

impl fmt::Display for PoiSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display-only rarity label carried by POIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Seen everywhere.
    #[default]
    Common,
    /// Seen occasionally.
    Uncommon,
    /// Seen rarely.
    Rare,
    /// Seen once.
    Legendary,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        };
        f.write_str(label)
    }
}
