//! Game state and core simulation types
//!
//! Everything the tick mutates lives here. World positions do not: the host
//! owns them and hands them in through a `SpatialIndex` every tick.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::respawn::RespawnManager;
use super::round::{RoundController, RoundPhase};
use crate::catalog::{Catalog, ItemId};
use crate::history::RoundHistory;
use crate::settings::{Settings, SettingsError};

/// Handle for a zone or trackable object (shared id space)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id allocator
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Shrink a highlight timer toward zero
#[inline]
fn decay(timer: &mut f32, dt: f32) {
    if *timer > 0.0 {
        *timer = (*timer - dt).max(0.0);
    }
}

/// A scan point on the pad
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorZone {
    pub id: EntityId,
    /// Nominal detection radius (before tolerance)
    pub radius: f32,
    /// Seconds left on the "beep" highlight after an honored scan
    #[serde(default)]
    pub pulse_timer: f32,
}

impl SensorZone {
    pub fn new(id: EntityId, radius: f32) -> Self {
        Self {
            id,
            radius,
            pulse_timer: 0.0,
        }
    }

    /// Squared detection reach with the jitter tolerance applied
    #[inline]
    pub fn reach_sq(&self, tolerance: f32) -> f32 {
        let reach = self.radius * tolerance;
        reach * reach
    }

    pub fn trigger_pulse(&mut self, duration: f32) {
        self.pulse_timer = duration;
    }
}

/// A movable item that can be carried to the pad
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackableObject {
    pub id: EntityId,
    pub item_id: ItemId,
    /// Shelf position a replacement goes back to once this one is sold
    pub home_slot: Vec3,
    /// Time of the last honored scan (`None` = never scanned)
    #[serde(default)]
    pub last_scan_timestamp: Option<f64>,
    /// Scanned out; waiting for its replacement and invisible to detection
    #[serde(default)]
    pub retired: bool,
    /// Seconds left on the spawn highlight
    #[serde(default)]
    pub pulse_timer: f32,
    /// Model scale from the catalog at spawn time
    pub display_scale: f32,
}

impl TrackableObject {
    pub fn new(id: EntityId, item_id: ItemId, home_slot: Vec3, display_scale: f32) -> Self {
        Self {
            id,
            item_id,
            home_slot,
            last_scan_timestamp: None,
            retired: false,
            pulse_timer: 0.0,
            display_scale,
        }
    }

    /// True while a previous scan still blocks a new one
    #[inline]
    pub fn is_cooling_down(&self, now: f64, cooldown_secs: f64) -> bool {
        self.last_scan_timestamp
            .is_some_and(|last| now - last < cooldown_secs)
    }

    pub fn mark_scanned(&mut self, now: f64) {
        self.last_scan_timestamp = Some(now);
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub catalog: Catalog,
    /// Round clock, phase and ledger
    pub round: RoundController,
    /// Scan points in registration order
    pub zones: Vec<SensorZone>,
    /// Tracked objects in spawn order
    pub objects: Vec<TrackableObject>,
    pub respawn: RespawnManager,
    /// Finished rounds this session
    pub history: RoundHistory,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) ids: EntityIds,
}

impl GameState {
    /// Build a fresh store; fails if the settings can't drive a round
    pub fn new(settings: Settings, catalog: Catalog) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            round: RoundController::new(&settings),
            respawn: RespawnManager::new(&settings),
            settings,
            catalog,
            zones: Vec::new(),
            objects: Vec::new(),
            history: RoundHistory::new(),
            time_ticks: 0,
            ids: EntityIds::default(),
        })
    }

    /// Register a scan point; zones are evaluated in registration order
    ///
    /// Radii that aren't finite and positive are refused.
    pub fn add_zone(&mut self, radius: f32) -> Option<EntityId> {
        if !radius.is_finite() || radius <= 0.0 {
            log::warn!("Ignoring sensor zone with radius {}", radius);
            return None;
        }
        let id = self.ids.allocate();
        self.zones.push(SensorZone::new(id, radius));
        Some(id)
    }

    /// Place a specific item in a slot (scene setup)
    pub fn spawn_object(&mut self, item_id: ItemId, home_slot: Vec3) -> EntityId {
        let id = self.ids.allocate();
        let scale = self.catalog.scale_of(&item_id);
        self.objects
            .push(TrackableObject::new(id, item_id, home_slot, scale));
        id
    }

    /// Fill each slot with a randomly drawn catalog item
    pub fn stock_slots(&mut self, slots: &[Vec3]) -> Vec<EntityId> {
        let mut spawned = Vec::with_capacity(slots.len());
        for &slot in slots {
            let Some(item_id) = self.respawn.draw_item(&self.catalog) else {
                log::warn!("Catalog is empty, slot {:?} left bare", slot);
                continue;
            };
            spawned.push(self.spawn_object(item_id, slot));
        }
        spawned
    }

    pub fn object(&self, id: EntityId) -> Option<&TrackableObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut TrackableObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn zone(&self, id: EntityId) -> Option<&SensorZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Objects still in play
    pub fn live_objects(&self) -> impl Iterator<Item = &TrackableObject> {
        self.objects.iter().filter(|o| !o.retired)
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    /// Abandon the current round and go back to Idle
    pub fn reset_round(&mut self) {
        self.round.reset();
    }

    /// Advance highlight timers
    pub(crate) fn decay_pulses(&mut self, dt: f32) {
        for zone in &mut self.zones {
            decay(&mut zone.pulse_timer, dt);
        }
        for object in &mut self.objects {
            decay(&mut object.pulse_timer, dt);
        }
    }
}
