//! Building lifecycle management system.
//!
//! Owns every building in the world, the registered building styles and the
//! region index used to answer "which building is the player building on".
//! Callers interact through the [`BuildingSystem`] trait or the inherent
//! methods of [`BuildingManager`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::game::building::{
    Building, BuildingDocument, BuildingType, BuildError, BuildResult, PartKind, StaleRef,
};
use crate::game::config::BuildConfig;
use crate::physics::{Aabb, Pose};
use crate::world::RegionGrid;

/// Stable identifier of a building owned by a [`BuildingManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingId(pub(crate) u32);

impl BuildingId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Building creation and lookup as seen by placement tools.
pub trait BuildingSystem {
    /// Start a new building of `building_type` with a foundation at the given pose
    fn create_building(
        &mut self,
        building_type: &str,
        position: Vec3,
        rotation: Quat,
        initial: PartKind,
    ) -> BuildResult<BuildingId>;

    /// Nearest building whose influence covers `position`
    fn building_in_range(&self, position: Vec3) -> Option<BuildingId>;

    /// Slots a part of `kind` exposes in `building_type`; 0 for anything unknown
    fn num_children_for_part_type(&self, building_type: &str, kind: PartKind) -> usize;
}

#[derive(Debug, Clone)]
struct Entry {
    building_type: String,
    building: Building,
}

/// Owns all buildings and answers range queries through a region grid.
#[derive(Debug)]
pub struct BuildingManager {
    config: BuildConfig,
    types: HashMap<String, BuildingType>,
    buildings: BTreeMap<BuildingId, Entry>,
    index: RegionGrid<BuildingId>,
    next_id: u32,
}

impl BuildingManager {
    /// Manager with no registered building types
    pub fn new(config: BuildConfig) -> Self {
        let index = RegionGrid::new(config.region_cell_size);
        Self {
            config,
            types: HashMap::new(),
            buildings: BTreeMap::new(),
            index,
            next_id: 0,
        }
    }

    /// Manager with the prototyping style registered
    pub fn with_standard_types(config: BuildConfig) -> Self {
        let mut manager = Self::new(config);
        manager.register_type(BuildingType::prototyping());
        manager
    }

    /// Add or replace a building style
    pub fn register_type(&mut self, building_type: BuildingType) {
        log::debug!("[Build] Registered building type '{}'", building_type.name);
        self.types.insert(building_type.name.clone(), building_type);
    }

    pub fn building_type(&self, name: &str) -> BuildResult<&BuildingType> {
        self.types
            .get(name)
            .ok_or_else(|| BuildError::UnknownBuildingType(name.to_string()))
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Register an already assembled building under a new id
    pub fn adopt(&mut self, building_type: &str, building: Building) -> BuildResult<BuildingId> {
        self.building_type(building_type)?;

        let id = BuildingId(self.next_id);
        self.next_id += 1;
        self.buildings.insert(
            id,
            Entry {
                building_type: building_type.to_string(),
                building,
            },
        );
        self.reindex(id);

        log::info!("[Build] Building {id} ({building_type}) registered");
        Ok(id)
    }

    /// Replay a document into a new building
    pub fn load_document(&mut self, document: &BuildingDocument) -> BuildResult<BuildingId> {
        let catalog = Arc::clone(&self.building_type(&document.building_type)?.catalog);
        let building = Building::from_records(catalog, self.config.clone(), &document.parts)?;
        self.adopt(&document.building_type, building)
    }

    /// Snapshot a building as a document
    pub fn document(&self, id: BuildingId) -> BuildResult<BuildingDocument> {
        let entry = self.entry(id)?;
        Ok(BuildingDocument::new(
            entry.building_type.clone(),
            entry.building.export_records(),
        ))
    }

    /// Run a structural edit on one building, then refresh its region index entry.
    pub fn edit<R>(
        &mut self,
        id: BuildingId,
        f: impl FnOnce(&mut Building) -> BuildResult<R>,
    ) -> BuildResult<R> {
        let entry = self
            .buildings
            .get_mut(&id)
            .ok_or(BuildError::StaleReference(StaleRef::Building(id)))?;
        let result = f(&mut entry.building);
        self.reindex(id);
        result
    }

    /// Tear down a building
    pub fn remove_building(&mut self, id: BuildingId) -> BuildResult<Building> {
        let entry = self
            .buildings
            .remove(&id)
            .ok_or(BuildError::StaleReference(StaleRef::Building(id)))?;
        self.index.remove(id);
        log::info!("[Build] Building {id} removed ({} parts)", entry.building.len());
        Ok(entry.building)
    }

    fn influence(&self, building: &Building) -> Option<Aabb> {
        building
            .bounds()
            .map(|bounds| bounds.inflated(self.config.influence_radius))
    }

    fn reindex(&mut self, id: BuildingId) {
        let influence = self
            .buildings
            .get(&id)
            .and_then(|entry| self.influence(&entry.building));
        match influence {
            Some(aabb) => self.index.insert(id, &aabb),
            None => {
                self.index.remove(id);
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    fn entry(&self, id: BuildingId) -> BuildResult<&Entry> {
        self.buildings
            .get(&id)
            .ok_or(BuildError::StaleReference(StaleRef::Building(id)))
    }

    pub fn get(&self, id: BuildingId) -> BuildResult<&Building> {
        Ok(&self.entry(id)?.building)
    }

    /// Name of the style `id` was created with
    pub fn type_of(&self, id: BuildingId) -> BuildResult<&str> {
        Ok(&self.entry(id)?.building_type)
    }

    /// Ids of all buildings, ascending
    pub fn ids(&self) -> impl Iterator<Item = BuildingId> + '_ {
        self.buildings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

impl BuildingSystem for BuildingManager {
    fn create_building(
        &mut self,
        building_type: &str,
        position: Vec3,
        rotation: Quat,
        initial: PartKind,
    ) -> BuildResult<BuildingId> {
        let catalog = Arc::clone(&self.building_type(building_type)?.catalog);
        let building = Building::create_at(
            catalog,
            self.config.clone(),
            Pose::new(position, rotation),
            initial,
        )?;
        log::info!(
            "[Build] New {building_type} building at ({:.2}, {:.2}, {:.2})",
            position.x,
            position.y,
            position.z
        );
        self.adopt(building_type, building)
    }

    fn building_in_range(&self, position: Vec3) -> Option<BuildingId> {
        self.index
            .query(position)
            .iter()
            .filter_map(|&id| {
                let entry = self.buildings.get(&id)?;
                let influence = self.influence(&entry.building)?;
                if !influence.contains(position) {
                    return None;
                }
                let bounds = entry.building.bounds()?;
                Some((bounds.distance_to(position), id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    fn num_children_for_part_type(&self, building_type: &str, kind: PartKind) -> usize {
        self.types
            .get(building_type)
            .map(|style| style.slot_count(kind))
            .unwrap_or(0)
    }
}
