//! Mesh Combiner - derived geometry of a whole building
//!
//! Every structural edit regenerates one merged mesh from the part list:
//! - One draw call per building
//! - Bounds for the building locator
//!
//! The combined mesh is a pure function of the part list, so rebuilding
//! without an intervening edit reproduces it exactly.

use super::catalog::PartCatalog;
use super::error::BuildResult;
use super::structure::PlacedPart;
use crate::game::types::{generate_posed_box, Mesh};
use crate::physics::Aabb;

/// Combined geometry of a building
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedMesh {
    /// Merged part hulls
    pub mesh: Mesh,
    /// Bounds of all vertices; `None` for an empty building
    pub bounds: Option<Aabb>,
    /// Number of parts merged in
    pub part_count: usize,
}

impl CombinedMesh {
    /// Merge the hull of every part into one mesh.
    ///
    /// Fails with `UnknownPartType` if a part's kind is missing from `catalog`.
    pub fn from_parts(parts: &[PlacedPart], catalog: &PartCatalog) -> BuildResult<Self> {
        let mut mesh = Mesh::new();
        let mut part_count = 0;

        for part in parts {
            let shape = catalog.part(part.kind)?.shape;
            mesh.merge(&generate_posed_box(
                part.pose,
                shape.center,
                shape.half_extents,
                shape.color,
            ));
            part_count += 1;
        }

        let bounds = Aabb::from_points(
            mesh.vertices
                .iter()
                .map(|v| glam::Vec3::from_array(v.position)),
        );

        Ok(Self {
            mesh,
            bounds,
            part_count,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.part_count == 0
    }
}
