//! Shelf restocking
//!
//! A sold object is retired on the spot, but its replacement is only queued.
//! The queue is flushed once per tick after detection finishes, so a fresh
//! object can never be scanned in the tick that created it.

use std::collections::HashSet;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{EntityId, EntityIds, TrackableObject};
use crate::bridge::PresentationBridge;
use crate::catalog::{Catalog, ItemId};
use crate::settings::Settings;

/// Slot position rounded to a fixed number of decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey([i64; 3]);

impl SlotKey {
    pub fn quantize(pos: Vec3, precision: u32) -> Self {
        let scale = 10f64.powi(precision as i32);
        let q = |v: f32| (v as f64 * scale).round() as i64;
        Self([q(pos.x), q(pos.y), q(pos.z)])
    }
}

/// A replacement waiting for the end-of-tick flush
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRespawn {
    /// The sold object this replaces
    pub retired_id: EntityId,
    pub home_slot: Vec3,
    pub item_id: ItemId,
}

/// Retires sold objects and restocks their slots
#[derive(Debug, Clone)]
pub struct RespawnManager {
    rng: Pcg32,
    queue: Vec<PendingRespawn>,
    slot_precision: u32,
    pulse_duration_secs: f32,
    /// Duplicate-slot respawns discarded since startup
    dropped: u64,
}

impl RespawnManager {
    pub fn new(settings: &Settings) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(settings.rng_seed),
            queue: Vec::new(),
            slot_precision: settings.slot_precision,
            pulse_duration_secs: settings.pulse_duration_secs,
            dropped: 0,
        }
    }

    /// Uniform draw from the catalog (with replacement)
    pub fn draw_item(&mut self, catalog: &Catalog) -> Option<ItemId> {
        if catalog.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..catalog.len());
        catalog.item_at(index).map(|item| item.id.clone())
    }

    /// Retire a sold object and queue a fresh item for its slot
    ///
    /// Returns the drawn item id, or `None` if nothing could be drawn (the
    /// object is still retired).
    pub fn consume_and_queue_respawn(
        &mut self,
        object: &mut TrackableObject,
        catalog: &Catalog,
    ) -> Option<ItemId> {
        object.retired = true;

        let Some(item_id) = self.draw_item(catalog) else {
            log::warn!("Nothing to restock slot {:?} with", object.home_slot);
            return None;
        };
        log::debug!(
            "Queued {} to replace {} at {:?}",
            item_id,
            object.id,
            object.home_slot
        );
        self.queue.push(PendingRespawn {
            retired_id: object.id,
            home_slot: object.home_slot,
            item_id: item_id.clone(),
        });
        Some(item_id)
    }

    pub fn pending(&self) -> &[PendingRespawn] {
        &self.queue
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Apply queued respawns
    ///
    /// The first respawn queued for a slot wins; later ones for the same slot
    /// are dropped. Every retired object named by the queue leaves tracking.
    /// Returns the ids of the new objects.
    pub fn flush(
        &mut self,
        objects: &mut Vec<TrackableObject>,
        catalog: &Catalog,
        ids: &mut EntityIds,
        bridge: &mut dyn PresentationBridge,
    ) -> Vec<EntityId> {
        if self.queue.is_empty() {
            return Vec::new();
        }

        let pending = std::mem::take(&mut self.queue);
        let mut claimed = HashSet::with_capacity(pending.len());
        let mut consumed = HashSet::with_capacity(pending.len());
        let mut fresh = Vec::with_capacity(pending.len());

        for respawn in pending {
            consumed.insert(respawn.retired_id);

            let key = SlotKey::quantize(respawn.home_slot, self.slot_precision);
            if !claimed.insert(key) {
                self.dropped += 1;
                log::debug!(
                    "Dropped duplicate respawn for slot {:?} (from {})",
                    respawn.home_slot,
                    respawn.retired_id
                );
                continue;
            }

            let scale = catalog.scale_of(&respawn.item_id);
            let mut object =
                TrackableObject::new(ids.allocate(), respawn.item_id, respawn.home_slot, scale);
            object.pulse_timer = self.pulse_duration_secs;
            fresh.push(object);
        }

        objects.retain(|o| !(o.retired && consumed.contains(&o.id)));

        let mut spawned = Vec::with_capacity(fresh.len());
        for object in fresh {
            bridge.on_object_spawned(&object, catalog.get(&object.item_id));
            spawned.push(object.id);
            objects.push(object);
        }
        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::GameEvent;
    use proptest::prelude::*;

    fn sold(id: u32, slot: Vec3) -> TrackableObject {
        TrackableObject::new(EntityId(id), ItemId::from("mug"), slot, 0.5)
    }

    #[test]
    fn test_respawn_keeps_slot() {
        let catalog = Catalog::default();
        let mut manager = RespawnManager::new(&Settings::default());
        let mut ids = EntityIds::default();
        let slot = Vec3::new(1.25, 0.9, -0.4);
        let mut objects = vec![sold(ids.allocate().0, slot)];

        let drawn = manager
            .consume_and_queue_respawn(&mut objects[0], &catalog)
            .unwrap();
        assert!(objects[0].retired);
        assert_eq!(manager.pending().len(), 1);

        let mut events: Vec<GameEvent> = Vec::new();
        let spawned = manager.flush(&mut objects, &catalog, &mut ids, &mut events);

        assert_eq!(spawned.len(), 1);
        assert_eq!(objects.len(), 1);
        let fresh = &objects[0];
        assert_eq!(fresh.id, spawned[0]);
        assert_eq!(fresh.home_slot, slot);
        assert_eq!(fresh.item_id, drawn);
        assert!(!fresh.retired);
        assert_eq!(fresh.last_scan_timestamp, None);
        assert_eq!(fresh.display_scale, catalog.scale_of(&drawn));
        assert!(fresh.pulse_timer > 0.0);
        assert!(manager.pending().is_empty());
        assert_eq!(
            events,
            vec![GameEvent::ObjectSpawned {
                id: fresh.id,
                item_id: drawn
            }]
        );
    }

    #[test]
    fn test_duplicate_slot_first_wins() {
        let catalog = Catalog::default();
        let mut manager = RespawnManager::new(&Settings::default());
        let mut ids = EntityIds::default();
        let slot = Vec3::new(0.5, 1.0, 0.0);
        // Second object sits within rounding distance of the same slot
        let mut objects = vec![
            sold(ids.allocate().0, slot),
            sold(ids.allocate().0, slot + Vec3::splat(0.0001)),
            sold(ids.allocate().0, Vec3::new(2.0, 1.0, 0.0)),
        ];

        let first = manager
            .consume_and_queue_respawn(&mut objects[0], &catalog)
            .unwrap();
        manager.consume_and_queue_respawn(&mut objects[1], &catalog);
        manager.consume_and_queue_respawn(&mut objects[2], &catalog);

        let spawned = manager.flush(&mut objects, &catalog, &mut ids, &mut ());
        assert_eq!(spawned.len(), 2);
        assert_eq!(manager.dropped_count(), 1);
        assert_eq!(objects.len(), 2);
        assert!(objects.iter().all(|o| !o.retired));
        assert_eq!(objects[0].home_slot, slot);
        assert_eq!(objects[0].item_id, first);
    }

    #[test]
    fn test_flush_with_empty_queue_is_noop() {
        let catalog = Catalog::default();
        let mut manager = RespawnManager::new(&Settings::default());
        let mut ids = EntityIds::default();
        let mut objects = vec![sold(ids.allocate().0, Vec3::ZERO)];
        assert!(manager.flush(&mut objects, &catalog, &mut ids, &mut ()).is_empty());
        assert_eq!(objects.len(), 1);
    }

    #[test]
    fn test_draws_are_seeded() {
        let catalog = Catalog::default();
        let mut a = RespawnManager::new(&Settings::default());
        let mut b = RespawnManager::new(&Settings::default());
        let draws_a: Vec<_> = (0..20).map(|_| a.draw_item(&catalog)).collect();
        let draws_b: Vec<_> = (0..20).map(|_| b.draw_item(&catalog)).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().all(|d| d.is_some()));
    }

    #[test]
    fn test_slot_key_precision() {
        let a = SlotKey::quantize(Vec3::new(1.0, 2.0, 3.0), 3);
        let b = SlotKey::quantize(Vec3::new(1.0002, 2.0, 3.0), 3);
        let c = SlotKey::quantize(Vec3::new(1.002, 2.0, 3.0), 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    proptest! {
        #[test]
        fn prop_distinct_slots_never_collide(
            x in -100.0f32..100.0,
            y in -100.0f32..100.0,
            z in -100.0f32..100.0,
            dx in 0.01f32..5.0,
        ) {
            let base = Vec3::new(x, y, z);
            prop_assert_eq!(SlotKey::quantize(base, 3), SlotKey::quantize(base, 3));
            prop_assert_ne!(
                SlotKey::quantize(base, 3),
                SlotKey::quantize(base + Vec3::new(dx, 0.0, 0.0), 3)
            );
        }
    }
}
