//! Scan-and-round simulation
//!
//! All gameplay logic lives here. This module stays free of I/O:
//! - One synchronous pass per tick, no threads
//! - Positions come in through `SpatialIndex`, feedback goes out through `PresentationBridge`
//! - Seeded RNG only
//! - Stable iteration order (zone registration order, object spawn order)

pub mod ledger;
pub mod proximity;
pub mod respawn;
pub mod round;
pub mod spatial;
pub mod state;
pub mod tick;

pub use ledger::{LedgerSnapshot, ScoreLedger};
pub use proximity::{DetectorParams, ScanEvent, ScanSweep, sweep};
pub use respawn::{PendingRespawn, RespawnManager, SlotKey};
pub use round::{RoundController, RoundOutcome, RoundPhase, RoundState, ScanGate};
pub use spatial::{SpatialIndex, WorldPositions};
pub use state::{EntityId, EntityIds, GameState, SensorZone, TrackableObject};
pub use tick::{TickInput, TickReport, tick};
