//! World Module
//!
//! World-space partitioning used to find which structure owns a point.

pub mod grid;

pub use grid::{RegionGrid, DEFAULT_REGION_SIZE};
