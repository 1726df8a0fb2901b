//! Shared Types Module
//!
//! Vertex and mesh types shared by the combined building geometry, plus
//! the posed-box generator every part shape is expanded with.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::physics::Pose;

// ============================================================================
// GPU VERTEX TYPES
// ============================================================================

/// Vertex for combined building geometry
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

static_assertions::assert_eq_size!(Vertex, [u8; 40]);

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color,
        }
    }
}

// ============================================================================
// MESH STRUCTURE
// ============================================================================

/// A mesh with vertices and indices
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &Mesh) {
        let base_idx = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base_idx));
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes, ready for a GPU buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes, ready for a GPU buffer upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

// ============================================================================
// MESH GENERATION
// ============================================================================

/// Generate a box placed by `pose`.
///
/// `center` and `half_extents` are in the pose's local space.
pub fn generate_posed_box(pose: Pose, center: Vec3, half_extents: Vec3, color: [f32; 4]) -> Mesh {
    let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);

    let corners = [
        Vec3::new(-hx, -hy, -hz),
        Vec3::new(hx, -hy, -hz),
        Vec3::new(hx, hy, -hz),
        Vec3::new(-hx, hy, -hz),
        Vec3::new(-hx, -hy, hz),
        Vec3::new(hx, -hy, hz),
        Vec3::new(hx, hy, hz),
        Vec3::new(-hx, hy, hz),
    ];

    let faces = [
        ([0, 1, 2, 3], Vec3::NEG_Z),
        ([5, 4, 7, 6], Vec3::Z),
        ([4, 0, 3, 7], Vec3::NEG_X),
        ([1, 5, 6, 2], Vec3::X),
        ([3, 2, 6, 7], Vec3::Y),
        ([4, 5, 1, 0], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (face_indices, normal) in &faces {
        let base = vertices.len() as u32;
        let world_normal = pose.rotation * *normal;
        for &i in face_indices {
            let pos = pose.transform_point(center + corners[i]);
            vertices.push(Vertex::new(pos, world_normal, color));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posed_box_counts() {
        let mesh = generate_posed_box(Pose::IDENTITY, Vec3::ZERO, Vec3::ONE, [1.0; 4]);
        assert_eq!(mesh.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(mesh.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
    }

    #[test]
    fn test_posed_box_is_translated() {
        let pose = Pose::from_position(Vec3::new(10.0, 0.0, 0.0));
        let mesh = generate_posed_box(pose, Vec3::new(0.0, 1.0, 0.0), Vec3::splat(0.5), [1.0; 4]);
        for v in &mesh.vertices {
            assert!(v.position[0] >= 9.5 && v.position[0] <= 10.5);
            assert!(v.position[1] >= 0.5 && v.position[1] <= 1.5);
        }
    }

    #[test]
    fn test_merge_offsets_indices() {
        let a = generate_posed_box(Pose::IDENTITY, Vec3::ZERO, Vec3::ONE, [1.0; 4]);
        let mut merged = Mesh::new();
        merged.merge(&a);
        merged.merge(&a);
        assert_eq!(merged.vertices.len(), 48);
        assert_eq!(merged.indices[36], 24);
        assert_eq!(merged.vertex_bytes().len(), 48 * std::mem::size_of::<Vertex>());
    }
}
