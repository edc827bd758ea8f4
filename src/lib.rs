//! Checkout Rush - scan-and-round gameplay core for a VR checkout game
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (proximity scans, round clock, ledger, respawns)
//! - `catalog`: Item definitions the store sells
//! - `bridge`: Notifications pushed out to the presentation layer
//! - `settings`: Round tuning loaded at construction
//! - `history`: In-session ranking of finished rounds

pub mod bridge;
pub mod catalog;
pub mod history;
pub mod settings;
pub mod sim;

pub use bridge::{GameEvent, LogBridge, PresentationBridge};
pub use catalog::{Catalog, CatalogError, ItemDefinition, ItemId};
pub use history::RoundHistory;
pub use settings::{MatchOrder, Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Length of one round
    pub const ROUND_DURATION_SECS: f32 = 30.0;
    /// Cart total needed to win a round
    pub const GOAL_VALUE: f64 = 150.0;
    /// Minimum time before the same object can be scanned again
    pub const SCAN_COOLDOWN_SECS: f64 = 0.75;
    /// Margin applied to a zone's nominal radius to absorb tracking jitter
    pub const ZONE_RADIUS_TOLERANCE: f32 = 1.1;
    /// Remaining time at which the one-shot low-time warning fires
    pub const LOW_TIME_WARNING_SECS: f32 = 10.0;
    /// Decimal places kept when comparing respawn slots
    pub const SLOT_PRECISION: u32 = 3;
    /// Length of the zone/object highlight pulse
    pub const PULSE_DURATION_SECS: f32 = 0.4;
    /// Fixed simulation timestep (90 Hz, a common headset refresh rate)
    pub const SIM_DT: f32 = 1.0 / 90.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Whole seconds shown on the countdown for a given remaining time
#[inline]
pub fn displayed_second(time_remaining: f32) -> u32 {
    time_remaining.max(0.0).ceil() as u32
}
