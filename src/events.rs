//! Events the engine reports to a presentation layer.

use serde::Serialize;

use crate::encounter::{Choice, EncounterOutcome, RewardSummary};
use crate::player::LevelUp;
use crate::world::{EntityCategory, EntityId};

/// Something the presentation layer may want to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EncounterEvent {
    /// An entity is inside the warning ring.
    ProximityWarning {
        /// The approaching entity.
        entity: EntityId,
        /// Its display name.
        name: String,
        /// Distance in meters.
        distance_m: f64,
    },
    /// An encounter opened.
    Triggered {
        /// The latched entity.
        entity: EntityId,
        /// Its collection.
        category: EntityCategory,
        /// Opening narrative line.
        title: String,
        /// Choices offered.
        choices: Vec<Choice>,
    },
    /// A narrative or combat log line.
    TurnResolved {
        /// The line.
        line: String,
    },
    /// An encounter ended.
    Resolved {
        /// The entity.
        entity: EntityId,
        /// How it ended.
        outcome: EncounterOutcome,
        /// What it paid out.
        rewards: RewardSummary,
    },
    /// The step balance changed.
    StepsChanged {
        /// New balance.
        balance: u32,
    },
    /// A choice was refused; nothing changed.
    ActionRejected {
        /// User-facing reason.
        message: String,
    },
    /// The player gained a level.
    LevelUp(LevelUp),
}

/// Receiver for [`EncounterEvent`]s.
pub trait EventSink {
    /// Deliver one event.
    fn emit(&mut self, event: EncounterEvent);
}

impl EventSink for Vec<EncounterEvent> {
    fn emit(&mut self, event: EncounterEvent) {
        self.push(event);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: EncounterEvent) {}
}

/// Sink that forwards every event to the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: EncounterEvent) {
        log::debug!("{event:?}");
    }
}
