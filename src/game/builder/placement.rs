//! Part Placement
//!
//! Per-frame preview of the selected part and the confirm/remove actions
//! behind the build and demolish buttons.

use glam::Vec3;

use crate::game::building::{BuildResult, PartId, PartKind, PrefabHandle, SlotId};
use crate::game::systems::{BuildingId, BuildingManager, BuildingSystem};
use crate::physics::Pose;

/// Instantiates the visible (or networked) representation of placed parts.
pub trait PartSpawner {
    type Handle;

    fn spawn(&mut self, kind: PartKind, prefab: PrefabHandle) -> Self::Handle;
    fn set_pose(&mut self, handle: &Self::Handle, pose: Pose);
}

/// Result of evaluating the selected part at a proposed pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementPreview {
    pub kind: PartKind,
    /// Display pose, lifted slightly so the ghost does not z-fight
    pub pose: Pose,
    /// Pose the part takes when confirmed
    pub snapped_pose: Pose,
    /// Building the cursor is over
    pub building: Option<BuildingId>,
    /// Slot the part snapped to
    pub slot: Option<SlotId>,
    /// The snapped slot already holds a part
    pub occupied: bool,
    pub can_build: bool,
}

/// A part committed by [`PlacementTool::confirm`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedHandle<H> {
    pub building: BuildingId,
    pub part: PartId,
    pub pose: Pose,
    pub handle: H,
}

/// Interactive placement of one part kind at a time
#[derive(Debug, Clone)]
pub struct PlacementTool {
    building_type: String,
    selected: PartKind,
    proposed: Option<Pose>,
    preview: Option<PlacementPreview>,
}

impl PlacementTool {
    /// Tool creating new buildings of `building_type`
    pub fn new(building_type: impl Into<String>, selected: PartKind) -> Self {
        Self {
            building_type: building_type.into(),
            selected,
            proposed: None,
            preview: None,
        }
    }

    pub fn select(&mut self, kind: PartKind) {
        if self.selected != kind {
            self.selected = kind;
            self.preview = None;
        }
    }

    pub fn selected(&self) -> PartKind {
        self.selected
    }

    pub fn building_type(&self) -> &str {
        &self.building_type
    }

    /// Last preview computed by [`PlacementTool::update`]
    pub fn preview(&self) -> Option<&PlacementPreview> {
        self.preview.as_ref()
    }

    /// Re-evaluate the preview for a new cursor pose
    pub fn update(&mut self, manager: &BuildingManager, proposed: Pose) -> BuildResult<PlacementPreview> {
        let preview = self.evaluate(manager, proposed)?;
        self.proposed = Some(proposed);
        self.preview = Some(preview);
        Ok(preview)
    }

    fn evaluate(&self, manager: &BuildingManager, proposed: Pose) -> BuildResult<PlacementPreview> {
        let kind = self.selected;
        let building_id = manager.building_in_range(proposed.position);

        let mut snapped_pose = proposed;
        let mut slot = None;
        let mut occupied = false;

        let is_foundation = match building_id {
            Some(id) => {
                let building = manager.get(id)?;
                // Free slots win; an occupied one only marks the ghost as blocked
                let hit = match building.match_part(kind, proposed, true)? {
                    Some(hit) => Some(hit),
                    None => building.match_part(kind, proposed, false)?,
                };
                if let Some(hit) = hit {
                    snapped_pose = building.snapped_pose(kind, hit.slot)?;
                    occupied = !building.is_slot_free(hit.slot)?;
                    slot = Some(hit.slot);
                }
                building.catalog().is_foundation(kind)?
            }
            None => manager
                .building_type(&self.building_type)?
                .catalog
                .is_foundation(kind)?,
        };

        let can_build = ((is_foundation && building_id.is_none()) || slot.is_some()) && !occupied;

        Ok(PlacementPreview {
            kind,
            pose: snapped_pose.lifted(manager.config().preview_lift),
            snapped_pose,
            building: building_id,
            slot,
            occupied,
            can_build,
        })
    }

    /// Commit the part at the last proposed pose.
    ///
    /// The preview is recomputed first, so a stale preview can never place a
    /// part. Returns `None` when nothing could be built there.
    pub fn confirm<S: PartSpawner>(
        &mut self,
        manager: &mut BuildingManager,
        spawner: &mut S,
    ) -> BuildResult<Option<PlacedHandle<S::Handle>>> {
        let Some(proposed) = self.proposed else {
            return Ok(None);
        };
        let preview = self.evaluate(manager, proposed)?;
        if !preview.can_build {
            self.preview = Some(preview);
            return Ok(None);
        }

        let kind = preview.kind;
        let (building, part) = match (preview.building, preview.slot) {
            (Some(id), Some(slot)) => {
                let part = manager.edit(id, |b| b.add_part(kind, Some(slot), preview.snapped_pose).map(|p| p.id))?;
                (id, part)
            }
            _ => {
                let id = manager.create_building(
                    &self.building_type,
                    preview.snapped_pose.position,
                    preview.snapped_pose.rotation,
                    kind,
                )?;
                let part = manager.get(id)?.part(0)?.id;
                (id, part)
            }
        };

        let placed = manager.get(building)?.part_by_id(part)?;
        let pose = placed.pose;
        let prefab = manager.get(building)?.catalog().prefab(kind)?;

        let handle = spawner.spawn(kind, prefab);
        spawner.set_pose(&handle, pose);

        // Refresh so the ghost reflects the part that now sits there
        self.preview = Some(self.evaluate(manager, proposed)?);

        Ok(Some(PlacedHandle {
            building,
            part,
            pose,
            handle,
        }))
    }

    /// Remove a part from the building in range of `position`.
    ///
    /// The removed part is the one closest to where the selected part would
    /// snap, or to `position` itself when nothing snaps. A building left
    /// without parts is torn down. Returns the removed part ids, or `None`
    /// when no building is in range.
    pub fn remove_under(
        &mut self,
        manager: &mut BuildingManager,
        position: Vec3,
    ) -> BuildResult<Option<Vec<PartId>>> {
        let preview = self.evaluate(manager, Pose::from_position(position))?;
        let Some(id) = preview.building else {
            return Ok(None);
        };
        let target = match preview.slot {
            Some(_) => preview.snapped_pose.position,
            None => position,
        };

        let removed = manager.edit(id, |building| match building.closest_part_index(target) {
            Some(index) => building.remove_part(index),
            None => Ok(Vec::new()),
        })?;

        if manager.get(id)?.is_empty() {
            manager.remove_building(id)?;
        }
        self.preview = None;
        Ok(Some(removed))
    }
}
