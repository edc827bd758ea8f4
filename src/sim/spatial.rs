//! World position lookup
//!
//! The host tracks where everything is (hands, shelves, the pad). The core
//! only asks.

use std::collections::HashMap;

use glam::Vec3;

use super::state::{EntityId, TrackableObject};

/// Read-only view of live world positions
pub trait SpatialIndex {
    /// Current position, or `None` if the entity can't be resolved this tick
    fn position(&self, id: EntityId) -> Option<Vec3>;
}

impl SpatialIndex for HashMap<EntityId, Vec3> {
    fn position(&self, id: EntityId) -> Option<Vec3> {
        self.get(&id).copied()
    }
}

/// Simple position table for hosts without their own scene graph
#[derive(Debug, Clone, Default)]
pub struct WorldPositions {
    positions: HashMap<EntityId, Vec3>,
}

impl WorldPositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: EntityId, pos: Vec3) {
        self.positions.insert(id, pos);
    }

    pub fn remove(&mut self, id: EntityId) {
        self.positions.remove(&id);
    }

    /// Put every object with no known position on its home slot
    pub fn place_at_home(&mut self, objects: &[TrackableObject]) {
        for object in objects {
            self.positions.entry(object.id).or_insert(object.home_slot);
        }
    }

    /// Forget positions of entities that are no longer tracked
    pub fn retain_tracked(&mut self, objects: &[TrackableObject], zones: &[EntityId]) {
        self.positions
            .retain(|id, _| zones.contains(id) || objects.iter().any(|o| o.id == *id));
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl SpatialIndex for WorldPositions {
    fn position(&self, id: EntityId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }
}
