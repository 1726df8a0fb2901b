//! Slot Registry - every connection point exposed by a building's parts
//!
//! Slots keep creation order. Ids are handed out monotonically and never
//! reused, so the backing vector stays sorted by id and lookups are a
//! binary search.

use std::fmt;

use glam::{Quat, Vec3};

use super::catalog::SlotType;
use super::structure::PartId;
use crate::physics::Pose;

/// Stable identifier of a slot inside one building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) u32);

impl SlotId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// A typed connection point on a placed part
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: SlotId,
    pub pose: Pose,
    pub slot_type: SlotType,
    /// Part that exposes this slot
    pub owner: PartId,
    /// Part attached here, if any
    occupant: Option<PartId>,
}

impl Slot {
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn rotation(&self) -> Quat {
        self.pose.rotation
    }

    pub fn occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn occupant(&self) -> Option<PartId> {
        self.occupant
    }
}

/// Aggregated slots of one building
#[derive(Debug, Clone, Default)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
    next_id: u32,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new free slot
    pub fn insert(&mut self, pose: Pose, slot_type: SlotType, owner: PartId) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            pose,
            slot_type,
            owner,
            occupant: None,
        });
        id
    }

    fn position_of(&self, id: SlotId) -> Option<usize> {
        self.slots.binary_search_by_key(&id, |s| s.id).ok()
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.position_of(id).map(|i| &self.slots[i])
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.position_of(id).is_some()
    }

    /// Mark `id` as consumed by `part`. Returns false if the slot is gone.
    pub fn occupy(&mut self, id: SlotId, part: PartId) -> bool {
        match self.position_of(id) {
            Some(i) => {
                self.slots[i].occupant = Some(part);
                true
            }
            None => false,
        }
    }

    /// Free `id`. Returns false if the slot is gone.
    pub fn release(&mut self, id: SlotId) -> bool {
        match self.position_of(id) {
            Some(i) => {
                self.slots[i].occupant = None;
                true
            }
            None => false,
        }
    }

    /// Drop every slot exposed by `owner`, returning them in creation order
    pub fn remove_owned_by(&mut self, owner: PartId) -> Vec<Slot> {
        let mut removed = Vec::new();
        self.slots.retain(|slot| {
            if slot.owner == owner {
                removed.push(slot.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// True when an occupied slot of `slot_type` already sits within `epsilon` of `position`
    pub fn coincides_with_occupied(&self, position: Vec3, slot_type: SlotType, epsilon: f32) -> bool {
        self.slots.iter().any(|slot| {
            slot.occupied()
                && slot.slot_type == slot_type
                && slot.position().distance(position) <= epsilon
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn of_type(&self, slot_type: SlotType) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(move |s| s.slot_type == slot_type)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.occupied()).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Pose {
        Pose::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = SlotRegistry::new();
        let a = registry.insert(at(0.0), SlotType::FoundationEdge, PartId(0));
        registry.remove_owned_by(PartId(0));
        let b = registry.insert(at(0.0), SlotType::FoundationEdge, PartId(1));

        assert_ne!(a, b);
        assert!(registry.get(a).is_none());
        assert!(registry.get(b).is_some());
    }

    #[test]
    fn test_occupy_and_release() {
        let mut registry = SlotRegistry::new();
        let id = registry.insert(at(1.0), SlotType::WallTop, PartId(0));
        assert!(!registry.get(id).unwrap().occupied());

        assert!(registry.occupy(id, PartId(3)));
        assert_eq!(registry.get(id).unwrap().occupant(), Some(PartId(3)));
        assert_eq!(registry.occupied_count(), 1);

        assert!(registry.release(id));
        assert!(!registry.get(id).unwrap().occupied());
        assert!(!registry.release(SlotId(99)));
    }

    #[test]
    fn test_remove_owned_by_keeps_order() {
        let mut registry = SlotRegistry::new();
        let a = registry.insert(at(0.0), SlotType::FoundationEdge, PartId(0));
        registry.insert(at(1.0), SlotType::FoundationEdge, PartId(1));
        let c = registry.insert(at(2.0), SlotType::FoundationEdge, PartId(0));
        let d = registry.insert(at(3.0), SlotType::FoundationEdge, PartId(2));

        let removed = registry.remove_owned_by(PartId(1));
        assert_eq!(removed.len(), 1);

        let ids: Vec<SlotId> = registry.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, c, d]);
        assert!(registry.get(d).is_some());
    }

    #[test]
    fn test_coincides_only_with_occupied_same_type() {
        let mut registry = SlotRegistry::new();
        let id = registry.insert(at(1.0), SlotType::FoundationEdge, PartId(0));
        let cursor = Vec3::new(1.0005, 0.0, 0.0);

        assert!(!registry.coincides_with_occupied(cursor, SlotType::FoundationEdge, 1e-3));
        registry.occupy(id, PartId(1));
        assert!(registry.coincides_with_occupied(cursor, SlotType::FoundationEdge, 1e-3));
        assert!(!registry.coincides_with_occupied(cursor, SlotType::WallTop, 1e-3));
        assert!(!registry.coincides_with_occupied(Vec3::new(1.1, 0.0, 0.0), SlotType::FoundationEdge, 1e-3));
    }
}
