//! Building errors
//!
//! Every fallible building operation validates before it mutates, so an
//! `Err` always leaves the building exactly as it was.

use std::fmt;

use thiserror::Error;

use super::catalog::{PartKind, SlotType};
use super::slots::SlotId;
use super::structure::PartId;
use crate::game::systems::BuildingId;

/// Why a part could not be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementFault {
    /// Non-foundation part without a target slot
    MissingSlot,
    /// Target slot already has a part attached
    SlotOccupied(SlotId),
    /// None of the part's connectors accept this slot type
    IncompatibleSlot(SlotType),
    /// A new structure must start with a foundation
    NotAFoundation,
    /// Replay found no slot within the acceptance radius
    NoSlotInRange,
}

impl fmt::Display for PlacementFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementFault::MissingSlot => write!(f, "attachable parts need a target slot"),
            PlacementFault::SlotOccupied(slot) => write!(f, "slot {slot} is already occupied"),
            PlacementFault::IncompatibleSlot(ty) => {
                write!(f, "no connector accepts a {ty:?} slot")
            }
            PlacementFault::NotAFoundation => write!(f, "a new building must start with a foundation"),
            PlacementFault::NoSlotInRange => write!(f, "no free slot within the acceptance radius"),
        }
    }
}

/// A reference that no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleRef {
    Part(PartId),
    Slot(SlotId),
    Building(BuildingId),
}

impl fmt::Display for StaleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleRef::Part(id) => write!(f, "part {id}"),
            StaleRef::Slot(id) => write!(f, "slot {id}"),
            StaleRef::Building(id) => write!(f, "building {id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid placement of {kind:?}: {fault}")]
    InvalidPlacement { kind: PartKind, fault: PlacementFault },

    #[error("part index {index} out of range (building has {len} parts)")]
    OutOfRange { index: usize, len: usize },

    #[error("part type {0:?} is not in the catalog")]
    UnknownPartType(PartKind),

    #[error("unknown building type '{0}'")]
    UnknownBuildingType(String),

    #[error("stale reference to {0}")]
    StaleReference(StaleRef),

    #[error("part {part} still has {dependents} attached part(s)")]
    HasDependents { part: PartId, dependents: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildError {
    pub(crate) fn placement(kind: PartKind, fault: PlacementFault) -> Self {
        BuildError::InvalidPlacement { kind, fault }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
