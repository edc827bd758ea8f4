//! Proximity scanning
//!
//! Pairs sensor zones with the objects close enough to them. The sweep only
//! classifies candidates; honoring a scan is the round's job.

use glam::Vec3;

use super::spatial::SpatialIndex;
use super::state::{EntityId, SensorZone, TrackableObject};
use crate::catalog::ItemId;
use crate::settings::{MatchOrder, Settings};

/// An object qualified for a zone this tick
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEvent {
    pub zone: EntityId,
    pub object: EntityId,
    pub item_id: ItemId,
    pub distance_sq: f32,
}

/// Per-tick detection parameters
#[derive(Debug, Clone, Copy)]
pub struct DetectorParams {
    pub now: f64,
    pub cooldown_secs: f64,
    pub radius_tolerance: f32,
    pub match_order: MatchOrder,
}

impl DetectorParams {
    pub fn from_settings(settings: &Settings, now: f64) -> Self {
        Self {
            now,
            cooldown_secs: settings.scan_cooldown_secs,
            radius_tolerance: settings.zone_radius_tolerance,
            match_order: settings.match_order,
        }
    }
}

/// Lazy sweep over every zone, yielding at most one event per zone
///
/// Each zone takes one object per tick and each object is taken by at most
/// one zone; zones are visited in registration order.
pub struct ScanSweep<'a> {
    zones: &'a [SensorZone],
    objects: &'a [TrackableObject],
    world: &'a dyn SpatialIndex,
    params: DetectorParams,
    next_zone: usize,
    /// Object positions resolved once per sweep (`None` = retired or unknown)
    positions: Vec<Option<Vec3>>,
    matched: Vec<bool>,
}

impl<'a> ScanSweep<'a> {
    pub fn new(
        zones: &'a [SensorZone],
        objects: &'a [TrackableObject],
        world: &'a dyn SpatialIndex,
        params: DetectorParams,
    ) -> Self {
        let positions = objects
            .iter()
            .map(|o| if o.retired { None } else { world.position(o.id) })
            .collect();
        Self {
            zones,
            objects,
            world,
            params,
            next_zone: 0,
            positions,
            matched: vec![false; objects.len()],
        }
    }

    /// Pick the candidate for one zone, if any
    fn match_zone(&self, zone: &SensorZone, zone_pos: Vec3) -> Option<(usize, f32)> {
        let reach_sq = zone.reach_sq(self.params.radius_tolerance);
        let mut best: Option<(usize, f32)> = None;

        for (idx, object) in self.objects.iter().enumerate() {
            if self.matched[idx] {
                continue;
            }
            let Some(pos) = self.positions[idx] else {
                continue;
            };
            let dist_sq = zone_pos.distance_squared(pos);
            if dist_sq > reach_sq {
                continue;
            }
            if object.is_cooling_down(self.params.now, self.params.cooldown_secs) {
                continue;
            }

            match self.params.match_order {
                MatchOrder::FirstCandidate => return Some((idx, dist_sq)),
                MatchOrder::Nearest => {
                    if best.is_none_or(|(_, best_sq)| dist_sq < best_sq) {
                        best = Some((idx, dist_sq));
                    }
                }
            }
        }

        best
    }
}

impl Iterator for ScanSweep<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        while let Some(zone) = self.zones.get(self.next_zone) {
            self.next_zone += 1;

            // Zone not resolvable this tick
            let Some(zone_pos) = self.world.position(zone.id) else {
                continue;
            };

            if let Some((idx, distance_sq)) = self.match_zone(zone, zone_pos) {
                self.matched[idx] = true;
                let object = &self.objects[idx];
                return Some(ScanEvent {
                    zone: zone.id,
                    object: object.id,
                    item_id: object.item_id.clone(),
                    distance_sq,
                });
            }
        }
        None
    }
}

/// Start a detection sweep
pub fn sweep<'a>(
    zones: &'a [SensorZone],
    objects: &'a [TrackableObject],
    world: &'a dyn SpatialIndex,
    params: DetectorParams,
) -> ScanSweep<'a> {
    ScanSweep::new(zones, objects, world, params)
}
