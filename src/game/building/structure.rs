//! Building - one connected structure of placed parts
//!
//! Owns the ordered part list, the slot registry and the combined mesh.
//! Every edit validates first and mutates second, then rebuilds the mesh.
//!
//! Parts are addressed two ways:
//! - by list index (shifts when an earlier part is removed)
//! - by [`PartId`] (stable, never reused; stale ids fail explicitly)

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use glam::Vec3;

use super::catalog::{PartCatalog, PartKind, PartType, SlotType};
use super::error::{BuildError, BuildResult, PlacementFault, StaleRef};
use super::matcher::{candidate_sockets, CandidateSocket, SlotMatch, SocketMatcher};
use super::mesh_combine::CombinedMesh;
use super::slots::{Slot, SlotId, SlotRegistry};
use crate::game::config::{BuildConfig, RemovalPolicy};
use crate::game::types::Mesh;
use crate::physics::{Aabb, Pose};

/// Stable identifier of a placed part inside one building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub(crate) u32);

impl PartId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A part placed in a building
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPart {
    pub id: PartId,
    pub kind: PartKind,
    pub pose: Pose,
    /// Slots this part exposes, in creation order
    pub exposed: Vec<SlotId>,
    /// Slot this part attached to; `None` for freely placed foundations and
    /// parts restored without support
    pub consumed: Option<SlotId>,
}

/// One connected structure
#[derive(Debug, Clone)]
pub struct Building {
    catalog: Arc<PartCatalog>,
    config: BuildConfig,
    parts: Vec<PlacedPart>,
    slots: SlotRegistry,
    next_part_id: u32,
    combined: CombinedMesh,
}

impl Building {
    /// Empty building: no parts, no slots
    pub fn new(catalog: Arc<PartCatalog>, config: BuildConfig) -> Self {
        Self {
            catalog,
            config,
            parts: Vec::new(),
            slots: SlotRegistry::new(),
            next_part_id: 0,
            combined: CombinedMesh::default(),
        }
    }

    /// Start a new building with a foundation at `pose`.
    ///
    /// Fails with `InvalidPlacement` when `initial` is not a foundation.
    pub fn create_at(
        catalog: Arc<PartCatalog>,
        config: BuildConfig,
        pose: Pose,
        initial: PartKind,
    ) -> BuildResult<Self> {
        if !catalog.is_foundation(initial)? {
            return Err(BuildError::placement(initial, PlacementFault::NotAFoundation));
        }
        let mut building = Self::new(catalog, config);
        building.add_part(initial, None, pose)?;
        Ok(building)
    }

    // ------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------

    /// Attach a part of `kind`.
    ///
    /// With a `target` slot the pose is derived from the slot through the
    /// first connector of the slot's type; foundations without a target are
    /// placed at `proposed`. Newly exposed slots that would coincide with an
    /// already-occupied slot of the same type are not created.
    pub fn add_part(
        &mut self,
        kind: PartKind,
        target: Option<SlotId>,
        proposed: Pose,
    ) -> BuildResult<&PlacedPart> {
        let catalog = Arc::clone(&self.catalog);
        let part_type = catalog.part(kind)?;
        let pose = self.resolve_pose(part_type, target, proposed)?;
        self.insert_part(part_type, target, pose)
    }

    /// Put back a part that no longer hangs off any slot, at `pose`.
    ///
    /// Used by document replay for parts whose supporting part was removed
    /// under the orphaning policy. Like such an orphan, the restored part
    /// consumes nothing but still exposes its own slots.
    pub(crate) fn restore_unattached(
        &mut self,
        kind: PartKind,
        pose: Pose,
    ) -> BuildResult<&PlacedPart> {
        let catalog = Arc::clone(&self.catalog);
        let part_type = catalog.part(kind)?;
        self.insert_part(part_type, None, pose)
    }

    /// Append a validated part: occupy `target`, expose the part's slots and rebuild
    fn insert_part(
        &mut self,
        part_type: &PartType,
        target: Option<SlotId>,
        pose: Pose,
    ) -> BuildResult<&PlacedPart> {
        let kind = part_type.kind;
        let id = PartId(self.next_part_id);
        self.next_part_id += 1;

        if let Some(slot) = target {
            self.slots.occupy(slot, id);
        }

        let mut exposed = Vec::with_capacity(part_type.sockets.len());
        for socket in &part_type.sockets {
            let world = pose.compose(socket.local_pose());
            if self.slots.coincides_with_occupied(
                world.position,
                socket.slot_type,
                self.config.coincident_epsilon,
            ) {
                continue;
            }
            exposed.push(self.slots.insert(world, socket.slot_type, id));
        }

        log::info!(
            "[Build] Placed {} at ({:.2}, {:.2}, {:.2}) ID={} slots={}{}",
            part_type.name,
            pose.position.x,
            pose.position.y,
            pose.position.z,
            id,
            exposed.len(),
            target.map(|s| format!(" on {s}")).unwrap_or_default(),
        );

        self.parts.push(PlacedPart {
            id,
            kind,
            pose,
            exposed,
            consumed: target,
        });
        self.rebuild()?;

        Ok(&self.parts[self.parts.len() - 1])
    }

    /// Check the preconditions of [`Building::add_part`] and compute the pose
    fn resolve_pose(&self, part_type: &PartType, target: Option<SlotId>, proposed: Pose) -> BuildResult<Pose> {
        let kind = part_type.kind;
        let Some(slot_id) = target else {
            if part_type.is_foundation() {
                return Ok(proposed);
            }
            return Err(BuildError::placement(kind, PlacementFault::MissingSlot));
        };

        let slot = self
            .slots
            .get(slot_id)
            .ok_or(BuildError::StaleReference(StaleRef::Slot(slot_id)))?;
        if slot.occupied() {
            return Err(BuildError::placement(kind, PlacementFault::SlotOccupied(slot_id)));
        }
        let connector = part_type
            .connector_for(slot.slot_type)
            .ok_or(BuildError::placement(kind, PlacementFault::IncompatibleSlot(slot.slot_type)))?;

        Ok(slot.pose.parent_for(connector.local_pose()))
    }

    /// Remove the part at `index` according to the configured removal policy.
    ///
    /// Returns the ids of every removed part, the requested one first.
    pub fn remove_part(&mut self, index: usize) -> BuildResult<Vec<PartId>> {
        let len = self.parts.len();
        if index >= len {
            return Err(BuildError::OutOfRange { index, len });
        }
        let root = self.parts[index].id;

        let removed = match self.config.removal_policy {
            RemovalPolicy::Orphan => {
                let orphans = self.dependents_of(index);
                if !orphans.is_empty() {
                    log::warn!(
                        "[Build] Removing {root} orphans {} attached part(s): {orphans:?}",
                        orphans.len()
                    );
                }
                self.detach(index);
                vec![root]
            }
            RemovalPolicy::Reject => {
                let dependents = self.dependents_of(index);
                if !dependents.is_empty() {
                    return Err(BuildError::HasDependents {
                        part: root,
                        dependents: dependents.len(),
                    });
                }
                self.detach(index);
                vec![root]
            }
            RemovalPolicy::Cascade => {
                let doomed = self.dependency_closure(root);
                for id in &doomed {
                    if let Some(i) = self.index_of(*id) {
                        self.detach(i);
                    }
                }
                doomed
            }
        };

        log::info!("[Build] Removed {} part(s), {} remain", removed.len(), self.parts.len());
        self.rebuild()?;
        Ok(removed)
    }

    /// [`Building::remove_part`] addressed by stable id
    pub fn remove_part_by_id(&mut self, id: PartId) -> BuildResult<Vec<PartId>> {
        let index = self
            .index_of(id)
            .ok_or(BuildError::StaleReference(StaleRef::Part(id)))?;
        self.remove_part(index)
    }

    /// Take a part out of the list, free its consumed slot and drop its exposed slots
    fn detach(&mut self, index: usize) -> PlacedPart {
        let part = self.parts.remove(index);
        if let Some(consumed) = part.consumed {
            // The supporting part may already be gone
            self.slots.release(consumed);
        }
        self.slots.remove_owned_by(part.id);
        part
    }

    /// `root` followed by every part transitively attached to it, breadth first
    fn dependency_closure(&self, root: PartId) -> Vec<PartId> {
        let mut order = vec![root];
        let mut seen: HashSet<PartId> = HashSet::from([root]);
        let mut cursor = 0;

        while cursor < order.len() {
            let current = order[cursor];
            cursor += 1;
            let Some(index) = self.index_of(current) else {
                continue;
            };
            for dependent in self.dependents_of(index) {
                if seen.insert(dependent) {
                    order.push(dependent);
                }
            }
        }
        order
    }

    /// Regenerate the combined mesh from the current part list.
    ///
    /// Every part kind was resolved against this catalog when it was added,
    /// so the lookup cannot fail after a successful edit.
    pub fn rebuild(&mut self) -> BuildResult<()> {
        self.combined = CombinedMesh::from_parts(&self.parts, &self.catalog)?;
        log::debug!(
            "[Rebuild] {} parts, {} triangles",
            self.combined.part_count,
            self.combined.mesh.triangle_count()
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    pub fn matcher(&self) -> SocketMatcher {
        SocketMatcher::new(self.config.acceptance_radius)
    }

    /// Closest slot of `slot_type` to a single point
    pub fn closest_slot(&self, position: Vec3, slot_type: SlotType, require_free: bool) -> Option<SlotMatch> {
        self.matcher().closest_to(position, slot_type, &self.slots, require_free)
    }

    /// Closest slot to any of `sockets`
    pub fn find_closest_slot(
        &self,
        sockets: impl IntoIterator<Item = CandidateSocket>,
        require_free: bool,
    ) -> Option<SlotMatch> {
        self.matcher().find_closest_slot(sockets, &self.slots, require_free)
    }

    /// Closest slot for a candidate part of `kind` posed at `pose`
    pub fn match_part(&self, kind: PartKind, pose: Pose, require_free: bool) -> BuildResult<Option<SlotMatch>> {
        let part_type = self.catalog.part(kind)?;
        Ok(self.find_closest_slot(candidate_sockets(part_type, pose), require_free))
    }

    /// Pose a part of `kind` takes when attached to `slot`
    pub fn snapped_pose(&self, kind: PartKind, slot: SlotId) -> BuildResult<Pose> {
        let part_type = self.catalog.part(kind)?;
        let slot = self.slot(slot)?;
        let connector = part_type
            .connector_for(slot.slot_type)
            .ok_or(BuildError::placement(kind, PlacementFault::IncompatibleSlot(slot.slot_type)))?;
        Ok(slot.pose.parent_for(connector.local_pose()))
    }

    /// Index of the part whose origin is closest to `position`; first found wins ties
    pub fn closest_part_index(&self, position: Vec3) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, part) in self.parts.iter().enumerate() {
            let distance = part.pose.position.distance(position);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    pub fn is_slot_free(&self, slot: SlotId) -> BuildResult<bool> {
        Ok(!self.slot(slot)?.occupied())
    }

    /// Ids of the parts attached to slots exposed by the part at `index`
    pub fn dependents_of(&self, index: usize) -> Vec<PartId> {
        let Some(part) = self.parts.get(index) else {
            return Vec::new();
        };
        part.exposed
            .iter()
            .filter_map(|id| self.slots.get(*id))
            .filter_map(Slot::occupant)
            .collect()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn parts(&self) -> &[PlacedPart] {
        &self.parts
    }

    pub fn part(&self, index: usize) -> BuildResult<&PlacedPart> {
        self.parts.get(index).ok_or(BuildError::OutOfRange {
            index,
            len: self.parts.len(),
        })
    }

    pub fn part_by_id(&self, id: PartId) -> BuildResult<&PlacedPart> {
        self.parts
            .iter()
            .find(|p| p.id == id)
            .ok_or(BuildError::StaleReference(StaleRef::Part(id)))
    }

    /// Current list index of a part
    pub fn index_of(&self, id: PartId) -> Option<usize> {
        self.parts.iter().position(|p| p.id == id)
    }

    pub fn slots(&self) -> &SlotRegistry {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> BuildResult<&Slot> {
        self.slots
            .get(id)
            .ok_or(BuildError::StaleReference(StaleRef::Slot(id)))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn combined(&self) -> &CombinedMesh {
        &self.combined
    }

    pub fn mesh(&self) -> &Mesh {
        &self.combined.mesh
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.combined.bounds
    }

    pub fn catalog(&self) -> &Arc<PartCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::building::catalog::{PartType, SlotType};
    use std::f32::consts::FRAC_PI_2;

    fn empty() -> Building {
        Building::new(Arc::new(PartCatalog::standard()), BuildConfig::default())
    }

    fn with_policy(policy: RemovalPolicy) -> Building {
        Building::new(
            Arc::new(PartCatalog::standard()),
            BuildConfig::default().with_removal_policy(policy),
        )
    }

    /// Foundation at the origin plus a wall on its +X edge
    fn foundation_and_wall(building: &mut Building) -> (PartId, PartId, SlotId) {
        let foundation = building
            .add_part(PartKind::RectFoundation, None, Pose::IDENTITY)
            .unwrap()
            .id;
        let edge = building
            .closest_slot(Vec3::new(1.0, 0.0, 0.0), SlotType::FoundationEdge, true)
            .unwrap()
            .slot;
        let wall = building
            .add_part(PartKind::Wall, Some(edge), Pose::IDENTITY)
            .unwrap()
            .id;
        (foundation, wall, edge)
    }

    #[test]
    fn test_foundation_exposes_free_slots() {
        let mut building = empty();
        let part = building
            .add_part(PartKind::RectFoundation, None, Pose::IDENTITY)
            .unwrap()
            .clone();

        let expected = PartType::rect_foundation().sockets.len();
        assert_eq!(building.len(), 1);
        assert_eq!(part.exposed.len(), expected);
        assert_eq!(building.slots().len(), expected);
        assert!(building.slots().iter().all(|s| !s.occupied()));
        assert_eq!(part.consumed, None);
    }

    #[test]
    fn test_wall_takes_pose_from_slot() {
        let mut building = empty();
        let (_, wall, edge) = foundation_and_wall(&mut building);

        let wall = building.part_by_id(wall).unwrap();
        assert!((wall.pose.position - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        assert!(wall.pose.rotation.angle_between(glam::Quat::from_rotation_y(FRAC_PI_2)) < 1e-4);
        assert_eq!(wall.consumed, Some(edge));
        assert!(!building.is_slot_free(edge).unwrap());

        let top = building.slot(wall.exposed[0]).unwrap();
        assert_eq!(top.slot_type, SlotType::WallTop);
        assert!((top.position() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_attachable_without_slot_is_rejected_atomically() {
        let mut building = empty();
        building.add_part(PartKind::RectFoundation, None, Pose::IDENTITY).unwrap();
        let slots_before = building.slots().len();

        let err = building.add_part(PartKind::Wall, None, Pose::IDENTITY).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidPlacement {
                fault: PlacementFault::MissingSlot,
                ..
            }
        ));
        assert_eq!(building.len(), 1);
        assert_eq!(building.slots().len(), slots_before);
    }

    #[test]
    fn test_occupied_slot_is_rejected() {
        let mut building = empty();
        let (_, _, edge) = foundation_and_wall(&mut building);

        let err = building.add_part(PartKind::Wall, Some(edge), Pose::IDENTITY).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidPlacement {
                fault: PlacementFault::SlotOccupied(_),
                ..
            }
        ));
        assert_eq!(building.len(), 2);
    }

    #[test]
    fn test_incompatible_slot_is_rejected() {
        let mut building = empty();
        let (_, wall, _) = foundation_and_wall(&mut building);
        let top = building.part_by_id(wall).unwrap().exposed[0];

        let err = building.add_part(PartKind::Stairs, Some(top), Pose::IDENTITY).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidPlacement {
                fault: PlacementFault::IncompatibleSlot(SlotType::WallTop),
                ..
            }
        ));
    }

    #[test]
    fn test_create_at_requires_foundation() {
        let catalog = Arc::new(PartCatalog::standard());
        let err = Building::create_at(catalog.clone(), BuildConfig::default(), Pose::IDENTITY, PartKind::Wall)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidPlacement {
                fault: PlacementFault::NotAFoundation,
                ..
            }
        ));

        let building =
            Building::create_at(catalog, BuildConfig::default(), Pose::IDENTITY, PartKind::TriFoundation).unwrap();
        assert_eq!(building.len(), 1);
        assert_eq!(building.slots().len(), 6);
    }

    #[test]
    fn test_coincident_occupied_slot_is_not_duplicated() {
        let mut building = empty();
        let (_, _, edge) = foundation_and_wall(&mut building);

        // Neighbour tile on +X shares the walled edge at x = 1
        let side = building
            .closest_slot(Vec3::new(2.0, 0.0, 0.0), SlotType::FoundationSide, true)
            .unwrap()
            .slot;
        let neighbour = building
            .add_part(PartKind::RectFoundation, Some(side), Pose::IDENTITY)
            .unwrap()
            .clone();

        assert_eq!(neighbour.exposed.len(), PartType::rect_foundation().sockets.len() - 1);
        let edges_at_x1 = building
            .slots()
            .of_type(SlotType::FoundationEdge)
            .filter(|s| (s.position() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-3)
            .count();
        assert_eq!(edges_at_x1, 1);
        assert!(!building.is_slot_free(edge).unwrap());
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut building = empty();
        assert!(matches!(
            building.remove_part(0),
            Err(BuildError::OutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_orphan_removal_leaves_stale_consumed_slot() {
        let mut building = empty();
        let (foundation, wall, edge) = foundation_and_wall(&mut building);

        let removed = building.remove_part(0).unwrap();
        assert_eq!(removed, vec![foundation]);
        assert_eq!(building.len(), 1);
        assert_eq!(building.part(0).unwrap().id, wall);
        assert_eq!(building.part(0).unwrap().consumed, Some(edge));
        assert!(matches!(
            building.is_slot_free(edge),
            Err(BuildError::StaleReference(StaleRef::Slot(_)))
        ));
        // Only the wall's own top slot is left
        assert_eq!(building.slots().len(), 1);
    }

    #[test]
    fn test_removing_attached_part_frees_its_slot() {
        let mut building = empty();
        let (_, wall, edge) = foundation_and_wall(&mut building);

        building.remove_part_by_id(wall).unwrap();
        assert!(building.is_slot_free(edge).unwrap());
        assert_eq!(building.slots().len(), PartType::rect_foundation().sockets.len());
        assert!(matches!(
            building.remove_part_by_id(wall),
            Err(BuildError::StaleReference(StaleRef::Part(_)))
        ));
    }

    #[test]
    fn test_reject_policy_keeps_supported_parts() {
        let mut building = with_policy(RemovalPolicy::Reject);
        let (foundation, _, _) = foundation_and_wall(&mut building);

        let err = building.remove_part(0).unwrap_err();
        assert!(matches!(err, BuildError::HasDependents { part, dependents: 1 } if part == foundation));
        assert_eq!(building.len(), 2);

        // The wall itself has nothing attached
        assert!(building.remove_part(1).is_ok());
        assert!(building.remove_part(0).is_ok());
        assert!(building.is_empty());
    }

    #[test]
    fn test_cascade_policy_removes_dependents() {
        let mut building = with_policy(RemovalPolicy::Cascade);
        let (foundation, wall, _) = foundation_and_wall(&mut building);
        let top = building.part_by_id(wall).unwrap().exposed[0];
        let upper = building.add_part(PartKind::Wall, Some(top), Pose::IDENTITY).unwrap().id;

        let removed = building.remove_part(0).unwrap();
        assert_eq!(removed, vec![foundation, wall, upper]);
        assert!(building.is_empty());
        assert!(building.slots().is_empty());
    }

    #[test]
    fn test_closest_part_index() {
        let mut building = empty();
        assert_eq!(building.closest_part_index(Vec3::ZERO), None);

        foundation_and_wall(&mut building);
        assert_eq!(building.closest_part_index(Vec3::new(-0.5, 0.0, 0.0)), Some(0));
        assert_eq!(building.closest_part_index(Vec3::new(1.2, 1.0, 0.0)), Some(1));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut building = empty();
        foundation_and_wall(&mut building);

        building.rebuild().unwrap();
        let first = building.combined().clone();
        building.rebuild().unwrap();
        assert_eq!(&first, building.combined());
        assert_eq!(first.part_count, 2);
    }

    #[test]
    fn test_snapped_pose_matches_add_part() {
        let mut building = empty();
        building.add_part(PartKind::RectFoundation, None, Pose::IDENTITY).unwrap();
        let side = building
            .closest_slot(Vec3::new(0.0, 0.0, -2.0), SlotType::FoundationSide, true)
            .unwrap()
            .slot;

        let expected = building.snapped_pose(PartKind::Stairs, side).unwrap();
        let stairs = building.add_part(PartKind::Stairs, Some(side), Pose::IDENTITY).unwrap();
        assert_eq!(stairs.pose, expected);
    }
}
