//! Keystone Engine Library
//!
//! Socket-based modular building: parts snap onto typed slots exposed by
//! already placed parts, and each connected structure is tracked as one
//! building with a combined mesh.
//!
//! # Modules
//!
//! - [`physics`] - Poses and bounding boxes
//! - [`world`] - Region grid used to locate buildings
//! - [`game`] - Part catalog, buildings, building manager and placement tool
//!
//! # Example
//!
//! ```ignore
//! use keystone_engine::game::{BuildConfig, BuildingManager, BuildingSystem, PartKind, PROTOTYPING};
//! use keystone_engine::physics::{Quat, Vec3};
//!
//! let mut manager = BuildingManager::with_standard_types(BuildConfig::default());
//! let id = manager.create_building(PROTOTYPING, Vec3::ZERO, Quat::IDENTITY, PartKind::RectFoundation)?;
//! assert_eq!(manager.building_in_range(Vec3::new(0.5, 0.0, 0.5)), Some(id));
//! ```

pub mod physics;
pub mod world;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export the most used types at crate level for convenience
pub use game::{BuildConfig, BuildError, BuildResult, Building, BuildingManager, BuildingSystem};
pub use physics::{Aabb, Pose};
pub use world::RegionGrid;
