//! Game Module
//!
//! Building gameplay on top of the engine: the part catalog, buildings,
//! the building manager and the placement tool.

pub mod builder;
pub mod building;
pub mod config;
pub mod systems;
pub mod types;

pub use types::{generate_posed_box, Mesh, Vertex};

pub use builder::{PartSpawner, PlacedHandle, PlacementPreview, PlacementTool};
pub use building::{
    Building, BuildingDocument, BuildingType, BuildError, BuildResult, PartCatalog, PartId, PartKind,
    PartRecord, PartType, PlacedPart, PlacementFault, Slot, SlotId, SlotType, StaleRef, PROTOTYPING,
};
pub use config::{BuildConfig, RemovalPolicy};
pub use systems::{BuildingId, BuildingManager, BuildingSystem};
