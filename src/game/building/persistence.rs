//! Building documents - JSON save/load of a building's part list
//!
//! Only the part list is stored. Slots and occupancy are reconstructed on
//! load by replaying every record through nearest-slot matching, the same
//! way the part was snapped when it was first placed.

use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::catalog::{PartCatalog, PartKind};
use super::error::BuildResult;
use super::structure::Building;
use crate::game::config::BuildConfig;
use crate::physics::Pose;

/// One placed part as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    pub kind: PartKind,
    pub position: Vec3,
    pub rotation: Quat,
}

impl PartRecord {
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }
}

/// Serialized building: its style name and parts in placement order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingDocument {
    pub building_type: String,
    pub parts: Vec<PartRecord>,
}

impl BuildingDocument {
    pub fn new(building_type: impl Into<String>, parts: Vec<PartRecord>) -> Self {
        Self {
            building_type: building_type.into(),
            parts,
        }
    }

    pub fn to_json(&self) -> BuildResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> BuildResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the document, creating parent directories as needed
    pub fn save(&self, path: &Path) -> BuildResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!(
            "[Save] {} part(s) of '{}' -> {}",
            self.parts.len(),
            self.building_type,
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> BuildResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let document = Self::from_json(&json)?;
        log::info!(
            "[Load] {} part(s) of '{}' <- {}",
            document.parts.len(),
            document.building_type,
            path.display()
        );
        Ok(document)
    }
}

impl Building {
    /// Part list as records, in part-list order
    pub fn export_records(&self) -> Vec<PartRecord> {
        self.parts()
            .iter()
            .map(|part| PartRecord {
                kind: part.kind,
                position: part.pose.position,
                rotation: part.pose.rotation,
            })
            .collect()
    }

    /// Rebuild a building by replaying `records` in order.
    ///
    /// Every record snaps to the closest free slot within the acceptance
    /// radius. An unmatched foundation is placed freely. Any other unmatched
    /// part was orphaned by a removal and is restored unattached, exposing
    /// its own slots.
    pub fn from_records(
        catalog: Arc<PartCatalog>,
        config: BuildConfig,
        records: &[PartRecord],
    ) -> BuildResult<Self> {
        let mut building = Self::new(catalog, config);

        for (index, record) in records.iter().enumerate() {
            let pose = record.pose();
            let is_foundation = building.catalog().is_foundation(record.kind)?;
            let target = building.match_part(record.kind, pose, true)?.map(|m| m.slot);

            log::debug!("[Load] replay #{index} {:?} -> {:?}", record.kind, target);
            if target.is_none() && !is_foundation {
                log::warn!(
                    "[Load] {:?} #{index} has no supporting slot, restoring unattached",
                    record.kind
                );
                building.restore_unattached(record.kind, pose)?;
            } else {
                building.add_part(record.kind, target, pose)?;
            }
        }

        Ok(building)
    }
}
