//! Builder Module
//!
//! Interactive tooling on top of the building manager: live placement
//! preview, confirm and demolish.

pub mod placement;

pub use placement::{PartSpawner, PlacedHandle, PlacementPreview, PlacementTool};
