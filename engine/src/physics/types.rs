//! Physics type re-exports from glam
//!
//! This module provides the core mathematical types used throughout
//! the building system, re-exported from the glam library, together with
//! the rigid [`Pose`] every placed part and slot carries.

pub use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World-space position + rotation of a part, slot or socket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with no rotation
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Pose at `position` rotated `yaw` radians around +Y
    pub fn from_yaw(position: Vec3, yaw: f32) -> Self {
        Self::new(position, Quat::from_rotation_y(yaw))
    }

    /// Transform a point from this pose's local space into world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Compose a child pose expressed in this pose's local space
    pub fn compose(&self, local: Pose) -> Pose {
        Pose {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Inverse of [`Pose::compose`]: the parent pose that places `local` exactly on `self`
    ///
    /// Used to snap a candidate part so that one of its connectors coincides
    /// with a slot.
    pub fn parent_for(&self, local: Pose) -> Pose {
        let rotation = (self.rotation * local.rotation.inverse()).normalize();
        Pose {
            position: self.position - rotation * local.position,
            rotation,
        }
    }

    /// Same position, raised by `lift` along world +Y
    pub fn lifted(&self, lift: f32) -> Pose {
        Pose {
            position: self.position + Vec3::Y * lift,
            rotation: self.rotation,
        }
    }
}
