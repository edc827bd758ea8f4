//! Simulation tick
//!
//! One call per rendered frame: clock, then detection over the whole object
//! set, then scoring, then restocking.

use super::proximity::{DetectorParams, ScanEvent, sweep};
use super::round::{RoundOutcome, ScanGate};
use super::spatial::SpatialIndex;
use super::state::{EntityId, GameState};
use crate::bridge::PresentationBridge;

/// Host inputs for a single tick
pub struct TickInput<'a> {
    /// Seconds since the previous tick
    pub dt: f32,
    /// Monotonic clock in seconds
    pub now: f64,
    /// Live positions of zones and objects
    pub world: &'a dyn SpatialIndex,
}

/// What happened during a tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Honored scans in detection order
    pub scans: Vec<ScanEvent>,
    /// Replacement objects created by the end-of-tick flush
    pub spawned: Vec<EntityId>,
    /// Verdict, if the clock ran out this tick
    pub round_ended: Option<RoundOutcome>,
}

/// Advance the game state by one step
pub fn tick(
    state: &mut GameState,
    input: &TickInput<'_>,
    bridge: &mut dyn PresentationBridge,
) -> TickReport {
    let mut report = TickReport::default();
    state.time_ticks += 1;
    state.decay_pulses(input.dt);

    // Clock first: a round can end and be re-armed by a scan in the same tick
    if let Some(outcome) = state.round.advance(input.dt, bridge) {
        if let Some(rank) = state.history.record(&outcome) {
            log::info!("Round placed #{} this session", rank);
        }
        report.round_ended = Some(outcome);
    }

    // Detect against the pre-tick object set before anything is applied
    let params = DetectorParams::from_settings(&state.settings, input.now);
    let events: Vec<ScanEvent> = sweep(&state.zones, &state.objects, input.world, params).collect();

    for event in events {
        let gate = state.round.honor_scan(&state.catalog, &event.item_id, bridge);
        if gate == ScanGate::Restarted {
            log::info!("Scan of {} re-armed the round", event.item_id);
        }
        log::debug!(
            "Scanned {} ({}) at zone {}",
            event.item_id,
            event.object,
            event.zone
        );

        if let Some(zone) = state.zones.iter_mut().find(|z| z.id == event.zone) {
            zone.trigger_pulse(state.settings.pulse_duration_secs);
        }

        if let Some(object) = state.objects.iter_mut().find(|o| o.id == event.object) {
            object.mark_scanned(input.now);
            if state.settings.retire_on_scan {
                state.respawn.consume_and_queue_respawn(object, &state.catalog);
                bridge.on_object_retired(object);
            }
        }

        report.scans.push(event);
    }

    // Restock after the sweep; new objects wait for the next tick
    let GameState {
        respawn,
        objects,
        catalog,
        ids,
        ..
    } = state;
    report.spawned = respawn.flush(objects, catalog, ids, bridge);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::GameEvent;
    use crate::catalog::{Catalog, ItemDefinition, ItemId};
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::round::RoundPhase;
    use crate::sim::spatial::WorldPositions;
    use glam::Vec3;

    const PAD: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    fn shop_catalog() -> Catalog {
        Catalog::new(vec![
            ItemDefinition::new("backpack", "Backpack", 29.99, "backpack", 1.0),
            ItemDefinition::new("headphones", "Headphones", 89.99, "headphones", 0.9),
            ItemDefinition::new("sneakers", "Sneakers", 39.99, "sneakers", 0.8),
        ])
        .unwrap()
    }

    /// One pad, three shelf slots holding the three catalog items
    fn shop(settings: Settings) -> (GameState, WorldPositions, [EntityId; 3]) {
        let mut state = GameState::new(settings, shop_catalog()).unwrap();
        let zone = state.add_zone(0.15).unwrap();
        let ids = [
            state.spawn_object(ItemId::from("backpack"), Vec3::new(-1.0, 1.0, 1.0)),
            state.spawn_object(ItemId::from("headphones"), Vec3::new(0.0, 1.0, 1.0)),
            state.spawn_object(ItemId::from("sneakers"), Vec3::new(1.0, 1.0, 1.0)),
        ];
        let mut world = WorldPositions::new();
        world.set(zone, PAD);
        world.place_at_home(&state.objects);
        (state, world, ids)
    }

    fn step(
        state: &mut GameState,
        world: &mut WorldPositions,
        dt: f32,
        now: f64,
        events: &mut Vec<GameEvent>,
    ) -> TickReport {
        let report = tick(state, &TickInput { dt, now, world: &*world }, events);
        world.place_at_home(&state.objects);
        report
    }

    #[test]
    fn test_winning_round() {
        let (mut state, mut world, [backpack, headphones, sneakers]) = shop(Settings::default());
        let mut events: Vec<GameEvent> = Vec::new();

        world.set(backpack, PAD);
        step(&mut state, &mut world, SIM_DT, 0.0, &mut events);
        world.set(headphones, PAD);
        step(&mut state, &mut world, 1.0, 1.0, &mut events);
        world.set(sneakers, PAD);
        step(&mut state, &mut world, 1.0, 2.0, &mut events);

        let tally = state.round.snapshot();
        assert_eq!(tally.scanned_count, 3);
        assert!((tally.cart_total - 159.97).abs() < 1e-6);

        let mut now = 2.0;
        let mut ended = None;
        while ended.is_none() && now < 60.0 {
            now += 1.0;
            ended = step(&mut state, &mut world, 1.0, now, &mut events).round_ended;
        }
        let outcome = ended.unwrap();
        assert!(outcome.won);
        assert_eq!(state.phase(), RoundPhase::Ended);
        assert_eq!(state.history.best_total(), Some(outcome.cart_total));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::RoundEnded { won: true, .. }))
                .count(),
            1
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == GameEvent::TimeLowWarning)
                .count(),
            1
        );
    }

    #[test]
    fn test_idle_round_never_times_out() {
        let (mut state, mut world, _) = shop(Settings::default());
        let mut events: Vec<GameEvent> = Vec::new();
        for i in 0..100 {
            step(&mut state, &mut world, 1.0, i as f64, &mut events);
        }
        assert_eq!(state.phase(), RoundPhase::Idle);
        assert_eq!(state.round.time_remaining(), 30.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_practice_pad_cooldown() {
        let settings = Settings {
            retire_on_scan: false,
            ..Settings::default()
        };
        let (mut state, mut world, [backpack, ..]) = shop(settings);
        let mut events: Vec<GameEvent> = Vec::new();
        world.set(backpack, PAD);

        assert_eq!(step(&mut state, &mut world, 0.0, 0.0, &mut events).scans.len(), 1);
        assert_eq!(step(&mut state, &mut world, 0.5, 0.5, &mut events).scans.len(), 0);
        assert_eq!(step(&mut state, &mut world, 0.3, 0.8, &mut events).scans.len(), 1);

        let object = state.object(backpack).unwrap();
        assert!(!object.retired);
        assert_eq!(object.last_scan_timestamp, Some(0.8));
        assert_eq!(state.round.snapshot().scanned_count, 2);
        assert_eq!(state.objects.len(), 3);
    }

    #[test]
    fn test_shared_object_scanned_by_one_zone() {
        let (mut state, mut world, [backpack, ..]) = shop(Settings::default());
        let second = state.add_zone(0.15).unwrap();
        world.set(second, PAD + Vec3::new(0.1, 0.0, 0.0));
        world.set(backpack, PAD + Vec3::new(0.05, 0.0, 0.0));

        let mut events: Vec<GameEvent> = Vec::new();
        let report = step(&mut state, &mut world, SIM_DT, 0.0, &mut events);

        assert_eq!(report.scans.len(), 1);
        assert_eq!(report.scans[0].zone, state.zones[0].id);
        assert!(state.zones[0].pulse_timer > 0.0);
        assert_eq!(state.zones[1].pulse_timer, 0.0);
        assert_eq!(state.round.snapshot().scanned_count, 1);
    }

    #[test]
    fn test_scanned_object_is_replaced_in_its_slot() {
        let (mut state, mut world, [_, headphones, _]) = shop(Settings::default());
        let home = state.object(headphones).unwrap().home_slot;
        world.set(headphones, PAD);

        let mut events: Vec<GameEvent> = Vec::new();
        let report = step(&mut state, &mut world, SIM_DT, 0.0, &mut events);

        assert_eq!(report.spawned.len(), 1);
        assert!(state.object(headphones).is_none());
        let fresh = state.object(report.spawned[0]).unwrap();
        assert_eq!(fresh.home_slot, home);
        assert!(!fresh.retired);
        assert_eq!(state.objects.len(), 3);
        assert!(events.contains(&GameEvent::ObjectRetired { id: headphones }));
    }

    #[test]
    fn test_replacement_not_scanned_in_spawn_tick() {
        // Slot sits on the pad, so the replacement spawns inside the zone
        let mut state = GameState::new(Settings::default(), shop_catalog()).unwrap();
        let zone = state.add_zone(0.15).unwrap();
        let first = state.spawn_object(ItemId::from("backpack"), PAD);
        let mut world = WorldPositions::new();
        world.set(zone, PAD);
        world.place_at_home(&state.objects);

        let mut events: Vec<GameEvent> = Vec::new();
        let report = step(&mut state, &mut world, SIM_DT, 0.0, &mut events);
        assert_eq!(report.scans.len(), 1);
        assert_eq!(report.scans[0].object, first);
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(state.round.snapshot().scanned_count, 1);

        // Next tick it's a normal candidate
        let replacement = report.spawned[0];
        let report = step(&mut state, &mut world, SIM_DT, 1.0, &mut events);
        assert_eq!(report.scans.len(), 1);
        assert_eq!(report.scans[0].object, replacement);
        assert_eq!(state.round.snapshot().scanned_count, 2);
    }

    #[test]
    fn test_scan_after_round_end_starts_new_round() {
        let (mut state, mut world, [backpack, ..]) = shop(Settings::default());
        let mut events: Vec<GameEvent> = Vec::new();
        world.set(backpack, PAD);
        step(&mut state, &mut world, SIM_DT, 0.0, &mut events);

        let report = step(&mut state, &mut world, 31.0, 31.0, &mut events);
        assert!(!report.round_ended.unwrap().won);
        assert_eq!(state.phase(), RoundPhase::Ended);

        let sneakers = state
            .live_objects()
            .find(|o| o.item_id == ItemId::from("sneakers"))
            .map(|o| o.id)
            .unwrap();
        world.set(sneakers, PAD);
        events.clear();
        step(&mut state, &mut world, SIM_DT, 32.0, &mut events);

        assert_eq!(state.phase(), RoundPhase::Running);
        let tally = state.round.snapshot();
        assert_eq!(tally.scanned_count, 1);
        assert!((tally.cart_total - 39.99).abs() < 1e-9);
        assert_eq!(events[0], GameEvent::RoundStarted);
        assert_eq!(state.history.rounds_played(), 1);
    }

    #[test]
    fn test_unknown_item_scores_zero() {
        let mut state = GameState::new(Settings::default(), shop_catalog()).unwrap();
        let zone = state.add_zone(0.15).unwrap();
        let mystery = state.spawn_object(ItemId::from("mystery"), Vec3::new(3.0, 1.0, 0.0));
        let mut world = WorldPositions::new();
        world.set(zone, PAD);
        world.set(mystery, PAD);

        let mut events: Vec<GameEvent> = Vec::new();
        let report = step(&mut state, &mut world, SIM_DT, 0.0, &mut events);
        assert_eq!(report.scans.len(), 1);
        let tally = state.round.snapshot();
        assert_eq!(tally.scanned_count, 1);
        assert_eq!(tally.cart_total, 0.0);
    }

    #[test]
    fn test_determinism() {
        // Same seed, same inputs, same restock
        let run = || {
            let (mut state, mut world, ids) = shop(Settings::default());
            let mut events: Vec<GameEvent> = Vec::new();
            for (i, id) in ids.iter().enumerate() {
                world.set(*id, PAD);
                step(&mut state, &mut world, 1.0, i as f64, &mut events);
            }
            state
                .objects
                .iter()
                .map(|o| o.item_id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
