//! Encounter error types.

use std::fmt;

use crate::encounter::Choice;
use crate::ledger::InsufficientSteps;
use crate::world::EntityId;

/// Why a dispatcher request was refused.
///
/// None of these are fatal. In every case the session, wallet and dice are
/// left exactly as they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterError {
    /// The wallet cannot cover the choice.
    InsufficientSteps(InsufficientSteps),
    /// A session is already open; the new trigger or latch reset is dropped.
    SessionActive {
        /// Entity of the open session.
        active: EntityId,
    },
    /// No session is open.
    NoActiveSession,
    /// The open session does not offer this choice right now.
    ChoiceNotOffered {
        /// The refused choice.
        choice: Choice,
    },
    /// The entity does not exist in the world.
    UnknownEntity(EntityId),
    /// The entity has already been encountered.
    AlreadyEncountered(EntityId),
}

impl fmt::Display for EncounterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientSteps(e) => write!(f, "{e}"),
            Self::SessionActive { active } => {
                write!(f, "an encounter with {active} is already in progress")
            }
            Self::NoActiveSession => write!(f, "no encounter in progress"),
            Self::ChoiceNotOffered { choice } => write!(f, "cannot {choice} right now"),
            Self::UnknownEntity(id) => write!(f, "unknown entity {id}"),
            Self::AlreadyEncountered(id) => write!(f, "{id} has already been encountered"),
        }
    }
}

impl std::error::Error for EncounterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InsufficientSteps(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InsufficientSteps> for EncounterError {
    fn from(e: InsufficientSteps) -> Self {
        Self::InsufficientSteps(e)
    }
}
