//! Round lifecycle
//!
//! `Idle` waits for the first scan with the clock parked at full duration.
//! `Running` counts down. `Ended` holds the verdict until the next scan
//! re-arms the round and is scored as its first sale.

use serde::{Deserialize, Serialize};

use super::ledger::{LedgerSnapshot, ScoreLedger};
use crate::bridge::PresentationBridge;
use crate::catalog::{Catalog, ItemId};
use crate::displayed_second;
use crate::settings::Settings;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Clock parked, waiting for the first scan
    Idle,
    /// Clock counting down
    Running,
    /// Clock hit zero, verdict delivered
    Ended,
}

/// Verdict of a finished round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub won: bool,
    pub scanned_count: u32,
    pub cart_total: f64,
    pub goal_value: f64,
}

/// How an honored scan affected the round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanGate {
    /// First scan out of Idle
    Started,
    /// Scan after a finished round; the round was reset first
    Restarted,
    /// Scan during a running round
    Continued,
}

/// Round clock and tally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: RoundPhase,
    /// Seconds left, always within `[0, round_duration_secs]`
    pub time_remaining: f32,
    pub round_duration_secs: f32,
    pub goal_value: f64,
    pub ledger: ScoreLedger,
    /// Low-time warning already delivered this round
    pub warning_fired: bool,
    /// Whole second last pushed to the countdown display
    pub displayed_second: Option<u32>,
    /// Verdict of the most recently finished round
    pub last_outcome: Option<RoundOutcome>,
}

/// Owns the round state machine; the only writer of `RoundState`
#[derive(Debug, Clone)]
pub struct RoundController {
    state: RoundState,
    low_time_warning_secs: f32,
}

impl RoundController {
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: RoundState {
                phase: RoundPhase::Idle,
                time_remaining: settings.round_duration_secs,
                round_duration_secs: settings.round_duration_secs,
                goal_value: settings.goal_value,
                ledger: ScoreLedger::new(),
                warning_fired: false,
                displayed_second: None,
                last_outcome: None,
            },
            low_time_warning_secs: settings.low_time_warning_secs,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn time_remaining(&self) -> f32 {
        self.state.time_remaining
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state.ledger.snapshot()
    }

    /// Advance the clock by `dt`
    ///
    /// Only a running round moves. Returns the verdict if the round ended
    /// during this call.
    pub fn advance(
        &mut self,
        dt: f32,
        bridge: &mut dyn PresentationBridge,
    ) -> Option<RoundOutcome> {
        if self.state.phase != RoundPhase::Running {
            return None;
        }

        let before = self.state.time_remaining;
        self.state.time_remaining =
            (before - dt.max(0.0)).clamp(0.0, self.state.round_duration_secs);
        let now = self.state.time_remaining;

        let threshold = self.low_time_warning_secs;
        if !self.state.warning_fired && before > threshold && now <= threshold && now > 0.0 {
            self.state.warning_fired = true;
            bridge.on_time_low_warning();
        }

        self.refresh_display(bridge);
        self.finish_if_expired(bridge)
    }

    /// Close out a round whose clock has run out
    ///
    /// Safe to call any number of times: only the first call after the clock
    /// reaches zero delivers a verdict.
    pub fn finish_if_expired(
        &mut self,
        bridge: &mut dyn PresentationBridge,
    ) -> Option<RoundOutcome> {
        if self.state.phase != RoundPhase::Running || self.state.time_remaining > 0.0 {
            return None;
        }

        self.state.phase = RoundPhase::Ended;
        let tally = self.state.ledger.snapshot();
        let outcome = RoundOutcome {
            won: tally.cart_total >= self.state.goal_value,
            scanned_count: tally.scanned_count,
            cart_total: tally.cart_total,
            goal_value: self.state.goal_value,
        };
        self.state.last_outcome = Some(outcome);

        log::info!(
            "Round ended: {} ({} items, ${:.2} / ${:.2})",
            if outcome.won { "won" } else { "lost" },
            outcome.scanned_count,
            outcome.cart_total,
            outcome.goal_value
        );
        bridge.on_round_ended(
            outcome.won,
            outcome.scanned_count,
            outcome.cart_total,
            outcome.goal_value,
        );
        Some(outcome)
    }

    /// Score one honored scan, starting or restarting the round as needed
    pub fn honor_scan(
        &mut self,
        catalog: &Catalog,
        item_id: &ItemId,
        bridge: &mut dyn PresentationBridge,
    ) -> ScanGate {
        let gate = match self.state.phase {
            RoundPhase::Idle => {
                self.start(bridge);
                ScanGate::Started
            }
            RoundPhase::Ended => {
                self.reset();
                self.start(bridge);
                ScanGate::Restarted
            }
            RoundPhase::Running => ScanGate::Continued,
        };

        self.state.ledger.record_sale(catalog, item_id);
        let tally = self.state.ledger.snapshot();
        bridge.on_scan_succeeded(item_id, tally.scanned_count, tally.cart_total);
        gate
    }

    /// Back to Idle with an empty ledger and a full clock
    pub fn reset(&mut self) {
        self.state.phase = RoundPhase::Idle;
        self.state.time_remaining = self.state.round_duration_secs;
        self.state.ledger.reset();
        self.state.warning_fired = false;
        self.state.displayed_second = None;
    }

    fn start(&mut self, bridge: &mut dyn PresentationBridge) {
        self.state.phase = RoundPhase::Running;
        self.state.time_remaining = self.state.round_duration_secs;
        self.state.warning_fired = false;
        self.state.displayed_second = None;
        log::info!(
            "Round started ({}s, goal ${:.2})",
            self.state.round_duration_secs,
            self.state.goal_value
        );
        bridge.on_round_started();
        self.refresh_display(bridge);
    }

    /// Push the countdown only when the shown second changes
    fn refresh_display(&mut self, bridge: &mut dyn PresentationBridge) {
        let shown = displayed_second(self.state.time_remaining);
        if self.state.displayed_second != Some(shown) {
            self.state.displayed_second = Some(shown);
            bridge.on_tick(self.state.time_remaining);
        }
    }
}
