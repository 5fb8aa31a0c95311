//! World entities and the arena that owns them.
//!
//! Entities are created once when the map loads and live for the session.
//! The engine only reads their position and stats and flips the one-shot
//! `encountered` latch. They are addressed by stable [`EntityId`]s so nothing
//! outside this module holds references into the arena.

mod catalog;

pub use catalog::{PoiSite, Rarity, Species, StatBlock};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// The three entity collections, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    /// Monsters; scanned first.
    Monster,
    /// Points of interest; scanned second.
    Poi,
    /// Mystery zones; scanned last.
    MysteryZone,
}

impl EntityCategory {
    /// Categories in the order the scanner visits them.
    pub const SCAN_ORDER: [EntityCategory; 3] = [
        EntityCategory::Monster,
        EntityCategory::Poi,
        EntityCategory::MysteryZone,
    ];

    const fn slot(self) -> usize {
        match self {
            EntityCategory::Monster => 0,
            EntityCategory::Poi => 1,
            EntityCategory::MysteryZone => 2,
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityCategory::Monster => "monster",
            EntityCategory::Poi => "point of interest",
            EntityCategory::MysteryZone => "mystery zone",
        };
        f.write_str(label)
    }
}

/// Stable handle to an entity in a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    /// Which collection the entity lives in.
    pub category: EntityCategory,
    /// Index within that collection.
    pub index: u32,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.category {
            EntityCategory::Monster => 'm',
            EntityCategory::Poi => 'p',
            EntityCategory::MysteryZone => 'z',
        };
        write!(f, "{prefix}{}", self.index)
    }
}

/// What an entity is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    /// A creature that can be fought.
    Monster {
        /// Catalog species.
        species: Species,
        /// Override for the species' default stats.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stats: Option<StatBlock>,
    },
    /// A point of interest.
    Poi {
        /// Catalog site.
        site: PoiSite,
        /// Display-only rarity.
        #[serde(default)]
        rarity: Rarity,
    },
    /// A zone that erodes sanity.
    MysteryZone {
        /// Display name.
        name: String,
    },
}

impl EntityKind {
    /// Plain monster of the given species with catalog stats.
    #[must_use]
    pub const fn monster(species: Species) -> Self {
        EntityKind::Monster {
            species,
            stats: None,
        }
    }

    /// Which collection this kind belongs to.
    #[must_use]
    pub const fn category(&self) -> EntityCategory {
        match self {
            EntityKind::Monster { .. } => EntityCategory::Monster,
            EntityKind::Poi { .. } => EntityCategory::Poi,
            EntityKind::MysteryZone { .. } => EntityCategory::MysteryZone,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            EntityKind::Monster { species, .. } => species.name(),
            EntityKind::Poi { site, .. } => site.name(),
            EntityKind::MysteryZone { name } => name,
        }
    }

    /// Effective stat block for monsters, `None` for other kinds.
    #[must_use]
    pub fn stat_block(&self) -> Option<StatBlock> {
        match self {
            EntityKind::Monster { species, stats } => Some(stats.unwrap_or(species.stats())),
            _ => None,
        }
    }
}

/// A positioned entity with its encounter latch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldEntity {
    /// Stable handle.
    pub id: EntityId,
    /// Where the entity stands.
    pub position: GeoPoint,
    /// What it is.
    pub kind: EntityKind,
    encountered: bool,
}

impl WorldEntity {
    /// Whether this entity has already triggered.
    #[must_use]
    pub const fn encountered(&self) -> bool {
        self.encountered
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Effective stat block for monsters, `None` for other kinds.
    #[must_use]
    pub fn stat_block(&self) -> Option<StatBlock> {
        self.kind.stat_block()
    }
}

/// Read access to entity collections plus the one write the engine needs.
///
/// The scanner and dispatcher only see the world through this trait, so a
/// map layer can expose its own storage without copying into a [`World`].
pub trait EntityProvider {
    /// The collection for `category`, or `None` when it has not been loaded.
    fn entities(&self, category: EntityCategory) -> Option<&[WorldEntity]>;

    /// Look up one entity.
    fn entity(&self, id: EntityId) -> Option<&WorldEntity> {
        let index = usize::try_from(id.index).ok()?;
        self.entities(id.category)?.get(index)
    }

    /// Latch `encountered` on an entity.
    ///
    /// Returns `true` only if this call flipped the latch from false to true.
    fn mark_encountered(&mut self, id: EntityId) -> bool;
}

/// Arena of world entities, one optional collection per category.
#[derive(Debug, Clone, Default)]
pub struct World {
    collections: [Option<Vec<WorldEntity>>; 3],
}

impl World {
    /// An empty world with every collection absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, creating its collection if needed.
    pub fn spawn(&mut self, position: GeoPoint, kind: EntityKind) -> EntityId {
        let category = kind.category();
        let list = self.collections[category.slot()].get_or_insert_with(Vec::new);
        let index = u32::try_from(list.len()).unwrap_or(u32::MAX);
        let id = EntityId { category, index };
        list.push(WorldEntity {
            id,
            position,
            kind,
            encountered: false,
        });
        id
    }

    /// Mark a category as loaded but empty.
    pub fn load_empty(&mut self, category: EntityCategory) {
        self.collections[category.slot()].get_or_insert_with(Vec::new);
    }

    /// Drop a whole collection, making it absent again.
    pub fn unload(&mut self, category: EntityCategory) {
        self.collections[category.slot()] = None;
    }

    /// Total number of entities across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.iter().flatten().map(Vec::len).sum()
    }

    /// Whether the world holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate every entity in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &WorldEntity> {
        self.collections.iter().flatten().flatten()
    }

    /// Number of entities whose latch is set.
    #[must_use]
    pub fn encountered_count(&self) -> usize {
        self.iter().filter(|e| e.encountered).count()
    }

    /// Clear every latch. Debug and quest resets only.
    pub fn reset_encounters(&mut self) {
        for entity in self.collections.iter_mut().flatten().flatten() {
            entity.encountered = false;
        }
        log::info!("all encounter latches reset");
    }
}

impl EntityProvider for World {
    fn entities(&self, category: EntityCategory) -> Option<&[WorldEntity]> {
        self.collections[category.slot()].as_deref()
    }

    fn mark_encountered(&mut self, id: EntityId) -> bool {
        let Ok(index) = usize::try_from(id.index) else {
            return false;
        };
        let Some(entity) = self.collections[id.category.slot()]
            .as_mut()
            .and_then(|list| list.get_mut(index))
        else {
            return false;
        };
        if entity.encountered {
            return false;
        }
        entity.encountered = true;
        true
    }
}
