//! Round leaderboard for the current session
//!
//! Kept in memory only; a new session starts with an empty board.

use serde::{Deserialize, Serialize};

use crate::sim::RoundOutcome;

/// Maximum number of rounds kept on the board
pub const MAX_ROUND_HISTORY: usize = 10;

/// A finished round on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub cart_total: f64,
    pub scanned_count: u32,
    pub won: bool,
    /// 1-based round number within the session
    pub round_number: u32,
}

/// Best rounds of the session, sorted by cart total (highest first)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundHistory {
    pub entries: Vec<RoundRecord>,
    rounds_played: u32,
    rounds_won: u32,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a total would land at, if it makes the board at all
    ///
    /// Entries stay sorted high to low and an equal total lands after the
    /// rounds already holding it.
    fn slot_for(&self, cart_total: f64) -> Option<usize> {
        if !cart_total.is_finite() || cart_total <= 0.0 {
            return None;
        }
        let index = self.entries.partition_point(|e| e.cart_total >= cart_total);
        (index < MAX_ROUND_HISTORY).then_some(index)
    }

    pub fn qualifies(&self, cart_total: f64) -> bool {
        self.slot_for(cart_total).is_some()
    }

    /// 1-based rank a total would reach
    pub fn potential_rank(&self, cart_total: f64) -> Option<usize> {
        self.slot_for(cart_total).map(|i| i + 1)
    }

    /// Tally a finished round; returns its 1-based rank if it made the board
    pub fn record(&mut self, outcome: &RoundOutcome) -> Option<usize> {
        self.rounds_played += 1;
        self.rounds_won += u32::from(outcome.won);

        let index = self.slot_for(outcome.cart_total)?;
        self.entries.insert(
            index,
            RoundRecord {
                cart_total: outcome.cart_total,
                scanned_count: outcome.scanned_count,
                won: outcome.won,
                round_number: self.rounds_played,
            },
        );
        self.entries.truncate(MAX_ROUND_HISTORY);
        Some(index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best_total(&self) -> Option<f64> {
        self.entries.first().map(|e| e.cart_total)
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn rounds_won(&self) -> u32 {
        self.rounds_won
    }
}
