//! # Cart Module
//!
//! The ephemeral shopping cart: quantities keyed by `CartKey`, owned by the
//! active session only and destroyed on submission or navigation away.
//!
//! The cart knows nothing about stock. Availability checks against the stock
//! snapshot happen in the deal engine and (authoritatively) in the external
//! place_order transaction.

use std::collections::HashMap;

use crate::catalog::{Catalog, CartKey};
use crate::money::Money;
use crate::MAX_LINE_QUANTITY;

/// Quantities keyed by (product, size).
///
/// Only positive quantities are stored; setting a line to zero removes it.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: HashMap<CartKey, i64>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Current quantity for a line, 0 when absent.
    pub fn quantity(&self, key: &CartKey) -> i64 {
        self.lines.get(key).copied().unwrap_or(0)
    }

    /// Sets a line quantity. Zero or negative removes the line; quantities
    /// are capped at [`MAX_LINE_QUANTITY`] to stop fat-finger orders.
    pub fn set_quantity(&mut self, key: CartKey, qty: i64) {
        if qty <= 0 {
            self.lines.remove(&key);
        } else {
            self.lines.insert(key, qty.min(MAX_LINE_QUANTITY));
        }
    }

    /// Adjusts a line by a delta, clamped at zero on the way down.
    pub fn adjust(&mut self, key: CartKey, delta: i64) {
        let next = self.quantity(&key) + delta;
        self.set_quantity(key, next);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.values().sum()
    }

    /// Iterates (key, quantity) lines in no particular order.
    pub fn lines(&self) -> impl Iterator<Item = (&CartKey, i64)> {
        self.lines.iter().map(|(k, q)| (k, *q))
    }

    /// Pre-discount subtotal of all resolvable lines.
    ///
    /// Lines whose key no longer resolves against the catalog are skipped;
    /// they cannot be priced and the composer rejects them before submission.
    pub fn subtotal(&self, catalog: &Catalog) -> Money {
        self.lines()
            .filter_map(|(key, qty)| {
                catalog
                    .resolve(key)
                    .map(|(_, size)| size.price.multiply_quantity(qty))
            })
            .fold(Money::zero(), |acc, line| acc + line)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_set_and_adjust() {
        let mut cart = Cart::new();
        let key = CartKey::new("caramelts", "lrg");

        cart.set_quantity(key.clone(), 2);
        assert_eq!(cart.quantity(&key), 2);

        cart.adjust(key.clone(), 1);
        assert_eq!(cart.quantity(&key), 3);

        cart.adjust(key.clone(), -5);
        assert_eq!(cart.quantity(&key), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut cart = Cart::new();
        let key = CartKey::new("prism-pops", "std");
        cart.set_quantity(key.clone(), 1);
        cart.set_quantity(key, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_cap() {
        let mut cart = Cart::new();
        let key = CartKey::new("prism-pops", "std");
        cart.set_quantity(key.clone(), MAX_LINE_QUANTITY + 50);
        assert_eq!(cart.quantity(&key), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_subtotal() {
        let catalog = Catalog::builtin();
        let mut cart = Cart::new();
        cart.set_quantity(CartKey::new("caramelts", "lrg"), 3); // 3 × $10
        cart.set_quantity(CartKey::new("caramelts", "reg"), 1); // 1 × $8

        assert_eq!(cart.subtotal(&catalog), Money::from_dollars(38));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_subtotal_skips_unresolvable_lines() {
        let catalog = Catalog::builtin();
        let mut cart = Cart::new();
        cart.set_quantity(CartKey::new("discontinued", "lrg"), 2);
        assert_eq!(cart.subtotal(&catalog), Money::zero());
    }
}
