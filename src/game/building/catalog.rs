//! Part Catalog - Static description of every placeable part
//!
//! Each part type lists the slots it exposes once placed, the connectors
//! it attaches with while it is still a candidate, and the box hull used
//! when the building's combined geometry is rebuilt.
//!
//! Local frame of every part: origin at its attachment point, +Y up and
//! +Z pointing away from the part it attached to.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::error::{BuildError, BuildResult};
use crate::physics::Pose;

/// Edge length of a square foundation tile (meters)
pub const TILE_SIZE: f32 = 2.0;

/// Half a tile: distance from a tile center to its edges
pub const HALF_TILE: f32 = TILE_SIZE / 2.0;

/// Foundation slab thickness; the slab's top face sits at local y = 0
pub const FOUNDATION_THICKNESS: f32 = 0.5;

/// Wall height (meters)
pub const WALL_HEIGHT: f32 = 2.0;

/// Wall thickness (meters)
pub const WALL_THICKNESS: f32 = 0.2;

/// Height gained by one flight of stairs (meters)
pub const STAIR_RISE: f32 = 1.0;

/// Name of the catalog shipped with the prototype builder
pub const PROTOTYPING: &str = "Prototyping";

/// Identifier of a part type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartKind {
    /// Square foundation tile
    RectFoundation,
    /// Equilateral triangle foundation tile
    TriFoundation,
    /// Solid wall standing on a foundation edge or another wall
    Wall,
    /// Wall with a window opening
    WindowWall,
    /// Flight of stairs hanging off a foundation side
    Stairs,
}

impl PartKind {
    pub const ALL: [PartKind; 5] = [
        PartKind::RectFoundation,
        PartKind::TriFoundation,
        PartKind::Wall,
        PartKind::WindowWall,
        PartKind::Stairs,
    ];
}

/// Connector kinds. A socket only ever attaches to a slot of the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotType {
    /// Neighbouring tile position next to a foundation (foundations, stairs)
    FoundationSide,
    /// Top edge of a foundation (walls)
    FoundationEdge,
    /// Top of a wall (stacked walls)
    WallTop,
}

/// Handle of the prefab a part is instantiated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrefabHandle(pub &'static str);

/// Category flag of a part type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartCategory {
    /// May be placed freely, without consuming a slot
    Foundation,
    /// Must consume exactly one free slot
    Attachable,
}

/// A typed connection point in part-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocketDescriptor {
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub slot_type: SlotType,
}

impl SocketDescriptor {
    pub fn new(local_position: Vec3, local_rotation: Quat, slot_type: SlotType) -> Self {
        Self {
            local_position,
            local_rotation,
            slot_type,
        }
    }

    /// Socket at the part origin
    pub fn at_origin(slot_type: SlotType) -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, slot_type)
    }

    pub fn local_pose(&self) -> Pose {
        Pose::new(self.local_position, self.local_rotation)
    }
}

/// Box hull of a part in part-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartShape {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub color: [f32; 4],
}

/// Immutable catalog entry
#[derive(Debug, Clone)]
pub struct PartType {
    pub kind: PartKind,
    pub name: &'static str,
    pub prefab: PrefabHandle,
    pub category: PartCategory,
    /// Slots this part exposes once placed, in creation order
    pub sockets: Vec<SocketDescriptor>,
    /// Points the unplaced part snaps with
    pub connectors: Vec<SocketDescriptor>,
    pub shape: PartShape,
}

impl PartType {
    pub fn is_foundation(&self) -> bool {
        self.category == PartCategory::Foundation
    }

    /// First connector able to attach to a slot of `slot_type`
    pub fn connector_for(&self, slot_type: SlotType) -> Option<&SocketDescriptor> {
        self.connectors.iter().find(|c| c.slot_type == slot_type)
    }

    /// Square foundation: a wall edge and a neighbour tile on each side
    pub fn rect_foundation() -> Self {
        let yaws = [0.0, FRAC_PI_2, PI, -FRAC_PI_2];
        Self {
            kind: PartKind::RectFoundation,
            name: "Rect Foundation",
            prefab: PrefabHandle("prefabs/rect_foundation"),
            category: PartCategory::Foundation,
            sockets: ring_sockets(&yaws, HALF_TILE, HALF_TILE),
            connectors: vec![SocketDescriptor::at_origin(SlotType::FoundationSide)],
            shape: PartShape {
                center: Vec3::new(0.0, -FOUNDATION_THICKNESS / 2.0, 0.0),
                half_extents: Vec3::new(HALF_TILE, FOUNDATION_THICKNESS / 2.0, HALF_TILE),
                color: [0.55, 0.55, 0.6, 1.0],
            },
        }
    }

    /// Triangle foundation (side = one tile) centered on its incenter
    pub fn tri_foundation() -> Self {
        let inradius = TILE_SIZE / (2.0 * 3.0_f32.sqrt());
        let yaws = [0.0, TAU / 3.0, 2.0 * TAU / 3.0];
        Self {
            kind: PartKind::TriFoundation,
            name: "Tri Foundation",
            prefab: PrefabHandle("prefabs/tri_foundation"),
            category: PartCategory::Foundation,
            sockets: ring_sockets(&yaws, inradius, HALF_TILE),
            connectors: vec![SocketDescriptor::at_origin(SlotType::FoundationSide)],
            // Box hull of the triangle
            shape: PartShape {
                center: Vec3::new(0.0, -FOUNDATION_THICKNESS / 2.0, 0.0),
                half_extents: Vec3::new(HALF_TILE, FOUNDATION_THICKNESS / 2.0, inradius * 1.5),
                color: [0.5, 0.5, 0.58, 1.0],
            },
        }
    }

    /// Wall spanning one tile edge along local X
    pub fn wall() -> Self {
        Self::wall_variant(
            PartKind::Wall,
            "Wall",
            PrefabHandle("prefabs/wall"),
            [0.72, 0.6, 0.45, 1.0],
        )
    }

    pub fn window_wall() -> Self {
        Self::wall_variant(
            PartKind::WindowWall,
            "Window Wall",
            PrefabHandle("prefabs/window_wall"),
            [0.75, 0.66, 0.5, 1.0],
        )
    }

    fn wall_variant(kind: PartKind, name: &'static str, prefab: PrefabHandle, color: [f32; 4]) -> Self {
        Self {
            kind,
            name,
            prefab,
            category: PartCategory::Attachable,
            sockets: vec![SocketDescriptor::new(
                Vec3::new(0.0, WALL_HEIGHT, 0.0),
                Quat::IDENTITY,
                SlotType::WallTop,
            )],
            connectors: vec![
                SocketDescriptor::at_origin(SlotType::FoundationEdge),
                SocketDescriptor::at_origin(SlotType::WallTop),
            ],
            shape: PartShape {
                center: Vec3::new(0.0, WALL_HEIGHT / 2.0, 0.0),
                half_extents: Vec3::new(HALF_TILE, WALL_HEIGHT / 2.0, WALL_THICKNESS / 2.0),
                color,
            },
        }
    }

    /// Stairs occupying the tile next to a foundation, rising along local +Z
    pub fn stairs() -> Self {
        Self {
            kind: PartKind::Stairs,
            name: "Stairs",
            prefab: PrefabHandle("prefabs/stairs"),
            category: PartCategory::Attachable,
            sockets: vec![SocketDescriptor::new(
                Vec3::new(0.0, STAIR_RISE, TILE_SIZE),
                Quat::IDENTITY,
                SlotType::FoundationSide,
            )],
            connectors: vec![SocketDescriptor::at_origin(SlotType::FoundationSide)],
            shape: PartShape {
                center: Vec3::new(0.0, STAIR_RISE / 2.0, 0.0),
                half_extents: Vec3::new(HALF_TILE, STAIR_RISE / 2.0, HALF_TILE),
                color: [0.6, 0.45, 0.3, 1.0],
            },
        }
    }
}

/// Edge slots at `edge_distance` then neighbour-tile slots one half tile
/// further out, for each outward yaw (yaw 0 faces +Z).
fn ring_sockets(yaws: &[f32], edge_distance: f32, neighbour_offset: f32) -> Vec<SocketDescriptor> {
    let edges = yaws.iter().map(|&yaw| {
        let rotation = Quat::from_rotation_y(yaw);
        SocketDescriptor::new(rotation * Vec3::Z * edge_distance, rotation, SlotType::FoundationEdge)
    });
    let sides = yaws.iter().map(|&yaw| {
        let rotation = Quat::from_rotation_y(yaw);
        SocketDescriptor::new(
            rotation * Vec3::Z * (edge_distance + neighbour_offset),
            rotation,
            SlotType::FoundationSide,
        )
    });
    edges.chain(sides).collect()
}

/// Exhaustive lookup table of part types
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: HashMap<PartKind, PartType>,
}

impl PartCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every part the prototype builder offers
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.insert(PartType::rect_foundation());
        catalog.insert(PartType::tri_foundation());
        catalog.insert(PartType::wall());
        catalog.insert(PartType::window_wall());
        catalog.insert(PartType::stairs());
        catalog
    }

    /// Add or replace a part type
    pub fn insert(&mut self, part: PartType) {
        self.parts.insert(part.kind, part);
    }

    pub fn part(&self, kind: PartKind) -> BuildResult<&PartType> {
        self.parts.get(&kind).ok_or(BuildError::UnknownPartType(kind))
    }

    pub fn contains(&self, kind: PartKind) -> bool {
        self.parts.contains_key(&kind)
    }

    /// Slots a placed part of this type exposes
    pub fn socket_descriptors(&self, kind: PartKind) -> BuildResult<&[SocketDescriptor]> {
        Ok(&self.part(kind)?.sockets)
    }

    pub fn connectors(&self, kind: PartKind) -> BuildResult<&[SocketDescriptor]> {
        Ok(&self.part(kind)?.connectors)
    }

    pub fn prefab(&self, kind: PartKind) -> BuildResult<PrefabHandle> {
        Ok(self.part(kind)?.prefab)
    }

    pub fn is_foundation(&self, kind: PartKind) -> BuildResult<bool> {
        Ok(self.part(kind)?.is_foundation())
    }

    /// Part types in the catalog, in `PartKind` order
    pub fn kinds(&self) -> Vec<PartKind> {
        let mut kinds: Vec<PartKind> = self.parts.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

/// A named building style and the parts it is assembled from
#[derive(Debug, Clone)]
pub struct BuildingType {
    pub name: String,
    pub catalog: Arc<PartCatalog>,
}

impl BuildingType {
    pub fn new(name: impl Into<String>, catalog: PartCatalog) -> Self {
        Self {
            name: name.into(),
            catalog: Arc::new(catalog),
        }
    }

    /// The prototyping style with the standard catalog
    pub fn prototyping() -> Self {
        Self::new(PROTOTYPING, PartCatalog::standard())
    }

    /// Number of slots a part of `kind` exposes; 0 when the style lacks that part
    pub fn slot_count(&self, kind: PartKind) -> usize {
        self.catalog
            .socket_descriptors(kind)
            .map(<[SocketDescriptor]>::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_exhaustive() {
        let catalog = PartCatalog::standard();
        for kind in PartKind::ALL {
            assert!(catalog.contains(kind), "{kind:?} missing");
            assert!(!catalog.connectors(kind).unwrap().is_empty());
        }
        assert_eq!(catalog.kinds(), PartKind::ALL.to_vec());
    }

    #[test]
    fn test_foundation_categories() {
        let catalog = PartCatalog::standard();
        assert!(catalog.is_foundation(PartKind::RectFoundation).unwrap());
        assert!(catalog.is_foundation(PartKind::TriFoundation).unwrap());
        assert!(!catalog.is_foundation(PartKind::Wall).unwrap());
        assert!(!catalog.is_foundation(PartKind::Stairs).unwrap());
    }

    #[test]
    fn test_rect_foundation_edge_slots() {
        let sockets = PartType::rect_foundation().sockets;
        assert_eq!(sockets.len(), 8);

        let edge_x = sockets
            .iter()
            .find(|s| s.slot_type == SlotType::FoundationEdge && (s.local_position - Vec3::X).length() < 1e-5);
        assert!(edge_x.is_some(), "expected an edge slot at +X");

        let sides = sockets.iter().filter(|s| s.slot_type == SlotType::FoundationSide);
        for side in sides {
            assert!((side.local_position.length() - TILE_SIZE).abs() < 1e-5);
        }
    }

    #[test]
    fn test_edge_slot_faces_outward() {
        for socket in PartType::rect_foundation().sockets {
            let outward = socket.local_rotation * Vec3::Z;
            assert!(outward.dot(socket.local_position.normalize()) > 0.999);
        }
    }

    #[test]
    fn test_unknown_part_type() {
        let catalog = PartCatalog::new();
        assert!(matches!(
            catalog.part(PartKind::Wall),
            Err(BuildError::UnknownPartType(PartKind::Wall))
        ));
    }

    #[test]
    fn test_slot_count() {
        let style = BuildingType::prototyping();
        assert_eq!(style.slot_count(PartKind::RectFoundation), 8);
        assert_eq!(style.slot_count(PartKind::TriFoundation), 6);
        assert_eq!(style.slot_count(PartKind::Wall), 1);

        let bare = BuildingType::new("Bare", PartCatalog::new());
        assert_eq!(bare.slot_count(PartKind::Wall), 0);
    }
}
