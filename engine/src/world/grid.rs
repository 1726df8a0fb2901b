//! Region Grid Module
//!
//! Coarse uniform grid over the XZ plane mapping cells to the keys whose
//! footprint overlaps them. Buildings register their influence box here so
//! "which building is near this point" only inspects a handful of candidates
//! instead of every structure in the world.
//!
//! ## Units
//! 1 unit = 1 meter. Y is ignored; a region column spans all heights.

use glam::{IVec2, Vec3};
use std::collections::HashMap;
use std::hash::Hash;

use crate::physics::Aabb;

/// Default region edge length (meters)
pub const DEFAULT_REGION_SIZE: f32 = 16.0;

/// Cell range (inclusive) covered by one registered footprint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Footprint {
    min: IVec2,
    max: IVec2,
}

/// Uniform XZ grid indexing keys by footprint.
#[derive(Clone, Debug)]
pub struct RegionGrid<K> {
    /// Region edge length (meters)
    cell_size: f32,
    /// Keys overlapping each cell, in registration order
    cells: HashMap<IVec2, Vec<K>>,
    /// Current footprint of every key
    footprints: HashMap<K, Footprint>,
}

impl<K: Copy + Eq + Hash> Default for RegionGrid<K> {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_SIZE)
    }
}

impl<K: Copy + Eq + Hash> RegionGrid<K> {
    /// Create an empty grid. Non-positive sizes fall back to [`DEFAULT_REGION_SIZE`].
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { DEFAULT_REGION_SIZE };
        Self {
            cell_size,
            cells: HashMap::new(),
            footprints: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Convert a world position to its region cell
    pub fn cell_of(&self, pos: Vec3) -> IVec2 {
        IVec2::new(
            (pos.x / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    /// Register (or move) `key` so that it covers every cell touched by `bounds`
    pub fn insert(&mut self, key: K, bounds: &Aabb) {
        let footprint = Footprint {
            min: self.cell_of(bounds.min),
            max: self.cell_of(bounds.max),
        };
        if self.footprints.get(&key) == Some(&footprint) {
            return;
        }
        self.remove(key);

        for x in footprint.min.x..=footprint.max.x {
            for z in footprint.min.y..=footprint.max.y {
                self.cells.entry(IVec2::new(x, z)).or_default().push(key);
            }
        }
        self.footprints.insert(key, footprint);
    }

    /// Unregister `key`. Returns false if it was not registered.
    pub fn remove(&mut self, key: K) -> bool {
        let Some(footprint) = self.footprints.remove(&key) else {
            return false;
        };
        for x in footprint.min.x..=footprint.max.x {
            for z in footprint.min.y..=footprint.max.y {
                let cell = IVec2::new(x, z);
                if let Some(keys) = self.cells.get_mut(&cell) {
                    keys.retain(|k| *k != key);
                    if keys.is_empty() {
                        self.cells.remove(&cell);
                    }
                }
            }
        }
        true
    }

    /// Keys whose footprint covers the cell containing `pos`
    pub fn query(&self, pos: Vec3) -> &[K] {
        self.cells
            .get(&self.cell_of(pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, key: K) -> bool {
        self.footprints.contains_key(&key)
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.footprints.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(min: (f32, f32), max: (f32, f32)) -> Aabb {
        Aabb::new(Vec3::new(min.0, 0.0, min.1), Vec3::new(max.0, 2.0, max.1))
    }

    #[test]
    fn test_cell_of_negative_coordinates() {
        let grid: RegionGrid<u32> = RegionGrid::new(10.0);
        assert_eq!(grid.cell_of(Vec3::new(0.0, 5.0, 9.9)), IVec2::new(0, 0));
        assert_eq!(grid.cell_of(Vec3::new(-0.1, 0.0, 10.0)), IVec2::new(-1, 1));
    }

    #[test]
    fn test_insert_spans_cells() {
        let mut grid = RegionGrid::new(10.0);
        grid.insert(7u32, &boxed((-5.0, -5.0), (15.0, 5.0)));

        assert_eq!(grid.query(Vec3::new(-3.0, 0.0, -3.0)), &[7]);
        assert_eq!(grid.query(Vec3::new(12.0, 100.0, 1.0)), &[7]);
        assert!(grid.query(Vec3::new(25.0, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_reinsert_moves_footprint() {
        let mut grid = RegionGrid::new(10.0);
        grid.insert(1u32, &boxed((0.0, 0.0), (1.0, 1.0)));
        grid.insert(1u32, &boxed((50.0, 50.0), (51.0, 51.0)));

        assert!(grid.query(Vec3::new(0.5, 0.0, 0.5)).is_empty());
        assert_eq!(grid.query(Vec3::new(50.5, 0.0, 50.5)), &[1]);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut grid = RegionGrid::new(10.0);
        grid.insert(1u32, &boxed((0.0, 0.0), (1.0, 1.0)));
        grid.insert(2u32, &boxed((0.0, 0.0), (1.0, 1.0)));

        assert!(grid.remove(1));
        assert!(!grid.remove(1));
        assert_eq!(grid.query(Vec3::new(0.5, 0.0, 0.5)), &[2]);
    }
}
