//! # Optimistic Stock Adjustment
//!
//! Admin stock +/- buttons feel instant by predicting the result locally,
//! then confirming or rolling back once the store answers. Instead of ad hoc
//! local mutation, the whole exchange is one small command value:
//!
//! ```text
//! Predicted ──confirm()──► Confirmed
//!     │
//!     └────rollback()───► RolledBack   (restores the pre-command level)
//! ```
//!
//! The command never talks to the store itself; callers apply it to their
//! cached snapshot, perform the point-write, and settle the command with the
//! outcome.

use serde::{Deserialize, Serialize};

use crate::catalog::Sku;
use crate::stock::StockSnapshot;

/// Where an adjustment command stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentState {
    /// Applied to the local snapshot, store outcome unknown.
    Predicted,
    /// Store accepted the write; the prediction stands.
    Confirmed,
    /// Store rejected the write; the prediction was undone.
    RolledBack,
}

/// One admin stock adjustment (+5, +1, -1) with an explicit rollback path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub sku: Sku,
    pub delta: i64,
    state: AdjustmentState,
    /// Level before the prediction, for rollback.
    previous_level: i64,
}

impl StockAdjustment {
    /// Applies the predicted outcome to a snapshot and returns the command.
    ///
    /// The predicted level clamps at zero, matching the store's own behavior
    /// for admin point-writes.
    pub fn apply(snapshot: &mut StockSnapshot, sku: Sku, delta: i64) -> Self {
        let previous_level = snapshot.level(&sku);
        snapshot.set(sku.clone(), previous_level + delta);
        StockAdjustment {
            sku,
            delta,
            state: AdjustmentState::Predicted,
            previous_level,
        }
    }

    pub fn state(&self) -> AdjustmentState {
        self.state
    }

    /// The level the snapshot shows while the command is in flight.
    pub fn predicted_level(&self) -> i64 {
        (self.previous_level + self.delta).max(0)
    }

    /// Settles the command: the store accepted the write.
    pub fn confirm(&mut self) {
        debug_assert_eq!(self.state, AdjustmentState::Predicted);
        self.state = AdjustmentState::Confirmed;
    }

    /// Settles the command: the store rejected the write. Restores the
    /// pre-command level in the snapshot.
    pub fn rollback(&mut self, snapshot: &mut StockSnapshot) {
        debug_assert_eq!(self.state, AdjustmentState::Predicted);
        snapshot.set(self.sku.clone(), self.previous_level);
        self.state = AdjustmentState::RolledBack;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sku() -> Sku {
        Sku::from("CARAMELTS-LRG")
    }

    #[test]
    fn test_predict_then_confirm() {
        let mut snapshot = StockSnapshot::from_pairs([(sku(), 4)]);
        let mut cmd = StockAdjustment::apply(&mut snapshot, sku(), 5);

        assert_eq!(cmd.state(), AdjustmentState::Predicted);
        assert_eq!(snapshot.level(&sku()), 9);

        cmd.confirm();
        assert_eq!(cmd.state(), AdjustmentState::Confirmed);
        assert_eq!(snapshot.level(&sku()), 9);
    }

    #[test]
    fn test_predict_then_rollback() {
        let mut snapshot = StockSnapshot::from_pairs([(sku(), 4)]);
        let mut cmd = StockAdjustment::apply(&mut snapshot, sku(), -1);
        assert_eq!(snapshot.level(&sku()), 3);

        cmd.rollback(&mut snapshot);
        assert_eq!(cmd.state(), AdjustmentState::RolledBack);
        assert_eq!(snapshot.level(&sku()), 4);
    }

    #[test]
    fn test_prediction_clamps_at_zero() {
        let mut snapshot = StockSnapshot::from_pairs([(sku(), 1)]);
        let cmd = StockAdjustment::apply(&mut snapshot, sku(), -5);
        assert_eq!(snapshot.level(&sku()), 0);
        assert_eq!(cmd.predicted_level(), 0);
    }

    #[test]
    fn test_rollback_on_unknown_sku() {
        let mut snapshot = StockSnapshot::empty();
        let mut cmd = StockAdjustment::apply(&mut snapshot, sku(), 5);
        assert_eq!(snapshot.level(&sku()), 5);

        cmd.rollback(&mut snapshot);
        assert_eq!(snapshot.level(&sku()), 0);
    }
}
