//! Physics module for Keystone
//!
//! Spatial primitives shared by the building core: poses, bounding boxes
//! and the glam math types.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types (Vec3, Quat) re-exported from glam, plus [`Pose`]
//! - [`bounds`] - Axis-aligned bounding boxes for combined building geometry

pub mod bounds;
pub mod types;

pub use bounds::Aabb;
pub use types::{Pose, Quat, Vec3};
