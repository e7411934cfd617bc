//! # Stock Snapshot
//!
//! A read-through copy of the external ledger's stock table (SKU → quantity).
//!
//! ## What a snapshot is NOT
//! A snapshot is never authoritative. It may be stale by one push-notification
//! round trip, and an empty snapshot means "unknown, nothing confirmed in
//! stock" rather than "everything sold out". The only authoritative stock
//! check in the whole system is the atomic place_order transaction inside the
//! external store. Everything built on a snapshot is advisory UX.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::Sku;

/// SKU → quantity snapshot of the stock table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    levels: HashMap<Sku, i64>,
}

impl StockSnapshot {
    /// An empty snapshot: stock state unknown.
    pub fn empty() -> Self {
        StockSnapshot::default()
    }

    /// Builds a snapshot from (sku, quantity) pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Sku, i64)>) -> Self {
        StockSnapshot {
            levels: pairs.into_iter().collect(),
        }
    }

    /// Returns the quantity for a SKU, 0 when the SKU is absent.
    ///
    /// "Not found" and "confirmed zero stock" are indistinguishable on
    /// purpose: both mean "cannot sell".
    pub fn level(&self, sku: &Sku) -> i64 {
        self.levels.get(sku).copied().unwrap_or(0)
    }

    /// Whether the snapshot carries any rows at all.
    ///
    /// Callers that care about correctness of availability display should
    /// gate on `!is_empty()` so a failed fetch reads as "unknown" rather
    /// than "all sold out".
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of known SKU rows.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Sets a level, clamping negatives to zero.
    pub fn set(&mut self, sku: Sku, qty: i64) {
        self.levels.insert(sku, qty.max(0));
    }

    /// Iterates over (sku, quantity) rows.
    pub fn iter(&self) -> impl Iterator<Item = (&Sku, i64)> {
        self.levels.iter().map(|(sku, qty)| (sku, *qty))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sku_reads_zero() {
        let snapshot = StockSnapshot::empty();
        assert_eq!(snapshot.level(&Sku::from("PRISM-POPS")), 0);
    }

    #[test]
    fn test_level_is_idempotent() {
        let snapshot = StockSnapshot::from_pairs([(Sku::from("CARAMELTS-LRG"), 4)]);
        assert_eq!(snapshot.level(&Sku::from("CARAMELTS-LRG")), 4);
        assert_eq!(snapshot.level(&Sku::from("CARAMELTS-LRG")), 4);
        assert_eq!(snapshot.level(&Sku::from("CARAMELTS-REG")), 0);
    }

    #[test]
    fn test_set_clamps_negative() {
        let mut snapshot = StockSnapshot::empty();
        snapshot.set(Sku::from("PRISM-POPS"), -3);
        assert_eq!(snapshot.level(&Sku::from("PRISM-POPS")), 0);
    }

    #[test]
    fn test_empty_means_unknown() {
        let snapshot = StockSnapshot::empty();
        assert!(snapshot.is_empty());

        let snapshot = StockSnapshot::from_pairs([(Sku::from("PRISM-POPS"), 0)]);
        // A confirmed zero row is NOT "unknown".
        assert!(!snapshot.is_empty());
    }
}
