//! Building - socket-based modular construction
//!
//! Features:
//! - Part catalog with typed slots (exposed) and connectors (snapping)
//! - Nearest-slot matching within an acceptance radius
//! - Buildings as ordered part lists plus an aggregated slot registry
//! - Combined mesh regenerated after every structural edit
//! - JSON documents replayed through the same snapping path

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod mesh_combine;
pub mod persistence;
pub mod slots;
pub mod structure;

pub use catalog::{
    BuildingType, PartCatalog, PartCategory, PartKind, PartShape, PartType, PrefabHandle, SlotType,
    SocketDescriptor, FOUNDATION_THICKNESS, HALF_TILE, PROTOTYPING, STAIR_RISE, TILE_SIZE, WALL_HEIGHT,
    WALL_THICKNESS,
};
pub use error::{BuildError, BuildResult, PlacementFault, StaleRef};
pub use matcher::{candidate_sockets, CandidateSocket, SlotMatch, SocketMatcher};
pub use mesh_combine::CombinedMesh;
pub use persistence::{BuildingDocument, PartRecord};
pub use slots::{Slot, SlotId, SlotRegistry};
pub use structure::{Building, PartId, PlacedPart};
