//! Encounter sessions.
//!
//! A triggered entity becomes an [`EncounterSession`] of the matching kind:
//! - Monster: intro offering fight, flee or observe, then a dice battle
//! - Point of interest: investigate (puzzle), sample or leave
//! - Mystery zone: investigate, meditate or leave
//!
//! The [`Dispatcher`] holds the one session slot and charges every choice
//! against the step wallet before resolving it.

mod choice;
mod dispatcher;
mod error;
mod session;

pub use choice::{Choice, MonsterChoice, MysteryChoice, PoiChoice};
pub use dispatcher::{ChoiceResult, Dispatcher, EncounterContext, Resolution};
pub use error::EncounterError;
pub use session::{EncounterKind, EncounterOutcome, EncounterSession, RewardSummary, SessionStage};
