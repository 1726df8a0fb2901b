//! Game systems - self-contained modules that own state and logic.

pub mod building_system;

pub use building_system::{BuildingId, BuildingManager, BuildingSystem};
