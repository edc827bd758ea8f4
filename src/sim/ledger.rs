//! Running tally for the active round

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ItemId};

/// Read-only copy of the ledger for presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub scanned_count: u32,
    pub cart_total: f64,
}

/// Scan count and cart value of the current round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreLedger {
    scanned_count: u32,
    cart_total: f64,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring up one honored scan
    ///
    /// Unknown items still count as scanned but add nothing to the total.
    /// Returns the price applied, `None` if the catalog had no entry.
    pub fn record_sale(&mut self, catalog: &Catalog, item_id: &ItemId) -> Option<f64> {
        self.scanned_count += 1;
        let price = catalog.price_of(item_id);
        match price {
            Some(price) => self.cart_total += price,
            None => log::warn!("Scanned unknown item {}, counting it as $0", item_id),
        }
        price
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            scanned_count: self.scanned_count,
            cart_total: self.cart_total,
        }
    }

    pub fn scanned_count(&self) -> u32 {
        self.scanned_count
    }

    pub fn cart_total(&self) -> f64 {
        self.cart_total
    }

    pub fn is_empty(&self) -> bool {
        self.scanned_count == 0
    }

    pub fn reset(&mut self) {
        self.scanned_count = 0;
        self.cart_total = 0.0;
    }
}
