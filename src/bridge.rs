//! Notifications pushed out of the simulation
//!
//! The core never renders, plays audio or draws text. It calls into a
//! `PresentationBridge` synchronously from inside the tick and the host turns
//! those calls into feedback.

use crate::catalog::{ItemDefinition, ItemId};
use crate::sim::{EntityId, TrackableObject};

/// Receiver for everything the player should see or hear
///
/// Every method defaults to a no-op so hosts only implement what they show.
#[allow(unused_variables)]
pub trait PresentationBridge {
    fn on_scan_succeeded(&mut self, item_id: &ItemId, scanned_count: u32, cart_total: f64) {}

    fn on_round_started(&mut self) {}

    /// Fired once per round when the clock drops to the warning threshold
    fn on_time_low_warning(&mut self) {}

    fn on_round_ended(&mut self, won: bool, scanned_count: u32, cart_total: f64, goal_value: f64) {}

    /// Countdown refresh, only when the displayed whole second changes
    fn on_tick(&mut self, time_remaining: f32) {}

    /// A scanned object left play; the host should hide it
    fn on_object_retired(&mut self, object: &TrackableObject) {}

    /// A replacement entered play at its slot; `item` is `None` for unknown ids
    fn on_object_spawned(&mut self, object: &TrackableObject, item: Option<&ItemDefinition>) {}
}

/// Silent bridge
impl PresentationBridge for () {}

/// Recorded notification (used by tests and replay tooling)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScanSucceeded {
        item_id: ItemId,
        scanned_count: u32,
        cart_total: f64,
    },
    RoundStarted,
    TimeLowWarning,
    RoundEnded {
        won: bool,
        scanned_count: u32,
        cart_total: f64,
        goal_value: f64,
    },
    Tick {
        time_remaining: f32,
    },
    ObjectRetired {
        id: EntityId,
    },
    ObjectSpawned {
        id: EntityId,
        item_id: ItemId,
    },
}

impl PresentationBridge for Vec<GameEvent> {
    fn on_scan_succeeded(&mut self, item_id: &ItemId, scanned_count: u32, cart_total: f64) {
        self.push(GameEvent::ScanSucceeded {
            item_id: item_id.clone(),
            scanned_count,
            cart_total,
        });
    }

    fn on_round_started(&mut self) {
        self.push(GameEvent::RoundStarted);
    }

    fn on_time_low_warning(&mut self) {
        self.push(GameEvent::TimeLowWarning);
    }

    fn on_round_ended(&mut self, won: bool, scanned_count: u32, cart_total: f64, goal_value: f64) {
        self.push(GameEvent::RoundEnded {
            won,
            scanned_count,
            cart_total,
            goal_value,
        });
    }

    fn on_tick(&mut self, time_remaining: f32) {
        self.push(GameEvent::Tick { time_remaining });
    }

    fn on_object_retired(&mut self, object: &TrackableObject) {
        self.push(GameEvent::ObjectRetired { id: object.id });
    }

    fn on_object_spawned(&mut self, object: &TrackableObject, _item: Option<&ItemDefinition>) {
        self.push(GameEvent::ObjectSpawned {
            id: object.id,
            item_id: object.item_id.clone(),
        });
    }
}

/// Bridge that narrates the round through the `log` facade
///
/// Stands in for the HUD when running headless.
#[derive(Debug, Default)]
pub struct LogBridge;

impl PresentationBridge for LogBridge {
    fn on_scan_succeeded(&mut self, item_id: &ItemId, scanned_count: u32, cart_total: f64) {
        log::info!("Beep! {} (items: {}, total: ${:.2})", item_id, scanned_count, cart_total);
    }

    fn on_round_started(&mut self) {
        log::info!("Round started");
    }

    fn on_time_low_warning(&mut self) {
        log::warn!("Hurry up - time is running out!");
    }

    fn on_round_ended(&mut self, won: bool, scanned_count: u32, cart_total: f64, goal_value: f64) {
        let verdict = if won { "WIN" } else { "LOSE" };
        log::info!(
            "Round over: {} - {} items, ${:.2} of ${:.2}",
            verdict,
            scanned_count,
            cart_total,
            goal_value
        );
    }

    fn on_tick(&mut self, time_remaining: f32) {
        log::debug!("Clock: {}s", crate::displayed_second(time_remaining));
    }

    fn on_object_spawned(&mut self, object: &TrackableObject, item: Option<&ItemDefinition>) {
        match item {
            Some(item) => log::debug!(
                "Restocked {} ({}) at {:?}",
                item.display_name,
                object.id,
                object.home_slot
            ),
            None => log::warn!(
                "Restocked unknown item {} at {:?} - it will sell for $0",
                object.item_id,
                object.home_slot
            ),
        }
    }
}
