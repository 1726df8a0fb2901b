//! Socket Matcher - closest compatible slot for a candidate part
//!
//! Runs every preview frame, so it is a plain nested scan over
//! (candidate sockets x registry slots) with no allocation. Slot counts per
//! building stay in the tens to low hundreds.

use glam::Vec3;

use super::catalog::{PartType, SlotType};
use super::slots::{SlotId, SlotRegistry};
use crate::physics::Pose;

/// A connection point of an unplaced part, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateSocket {
    pub position: Vec3,
    pub slot_type: SlotType,
}

impl CandidateSocket {
    pub fn new(position: Vec3, slot_type: SlotType) -> Self {
        Self { position, slot_type }
    }
}

/// Winning (socket, slot) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotMatch {
    pub slot: SlotId,
    pub distance: f32,
    /// Index of the candidate socket that matched
    pub socket_index: usize,
}

/// World-space candidate sockets of `part` posed at `pose`
pub fn candidate_sockets(part: &PartType, pose: Pose) -> impl Iterator<Item = CandidateSocket> + '_ {
    part.connectors
        .iter()
        .map(move |c| CandidateSocket::new(pose.transform_point(c.local_position), c.slot_type))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocketMatcher {
    /// Matches at or beyond this distance are rejected
    pub acceptance_radius: f32,
}

impl SocketMatcher {
    pub fn new(acceptance_radius: f32) -> Self {
        Self { acceptance_radius }
    }

    /// Closest slot of matching type across all `sockets`.
    ///
    /// Only strictly-closer pairs replace the current best, so ties keep the
    /// first pair in (socket, slot) iteration order.
    pub fn find_closest_slot(
        &self,
        sockets: impl IntoIterator<Item = CandidateSocket>,
        slots: &SlotRegistry,
        require_free: bool,
    ) -> Option<SlotMatch> {
        let mut best: Option<SlotMatch> = None;
        let mut best_distance = self.acceptance_radius;

        for (socket_index, socket) in sockets.into_iter().enumerate() {
            for slot in slots.of_type(socket.slot_type) {
                if require_free && slot.occupied() {
                    continue;
                }
                let distance = socket.position.distance(slot.position());
                if distance < best_distance {
                    best_distance = distance;
                    best = Some(SlotMatch {
                        slot: slot.id,
                        distance,
                        socket_index,
                    });
                }
            }
        }

        best
    }

    /// Single-cursor variant used for live previews
    pub fn closest_to(
        &self,
        position: Vec3,
        slot_type: SlotType,
        slots: &SlotRegistry,
        require_free: bool,
    ) -> Option<SlotMatch> {
        self.find_closest_slot([CandidateSocket::new(position, slot_type)], slots, require_free)
    }
}
