//! # Order Composition & State Machine
//!
//! Turns (cart, bundle selection, deal outputs) into the flat, submission
//! ready item list the external place_order transaction consumes, plus the
//! human-readable order code and the final total.
//!
//! ## Composition Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Composition                                  │
//! │                                                                         │
//! │  Cart lines (qty > 0) ───────────► one stock-bearing line each         │
//! │                                                                         │
//! │  Bundle selection ───┬───────────► one stock-bearing line per pick     │
//! │                      └───────────► ONE display-only aggregate line     │
//! │                                    (never decremented, shown to the    │
//! │                                     customer/admin as the bundle row)  │
//! │                                                                         │
//! │  total = (subtotal − tier savings + bundle price) + delivery fee       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::cart::Cart;
use crate::catalog::{Catalog, Sku};
use crate::deals::{BundleSelection, DealBook, DeliveryPolicy};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::FALLBACK_CODE_PREFIX;

// =============================================================================
// Order Line Items
// =============================================================================

/// One line of the submission payload.
///
/// `stock_bearing` is the flag the external transaction keys its decrement
/// pass on: cart lines and bundle component lines carry stock, the synthetic
/// bundle aggregate line does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineItem {
    pub sku: Sku,

    /// Display name frozen at composition time.
    pub name: String,

    /// Unit price frozen at composition time.
    pub unit_price: Money,

    pub quantity: i64,

    /// Whether the external transaction decrements stock for this line.
    pub stock_bearing: bool,

    /// Whether this line is a component of a customizable bundle.
    pub bundle_component: bool,
}

impl OrderLineItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order Status State Machine
// =============================================================================

/// Lifecycle of an order row in the external store.
///
/// ```text
/// pending_payment ──► paid ──► fulfilled
///        │
///        ├──► cancelled ──► paid   (admin reopen, re-applies decrement)
///        └──► expired   ──► paid   (admin reopen, re-applies decrement)
/// ```
///
/// Reopen idempotency is the caller's responsibility: reopening twice
/// double-decrements, the machinery here only answers "is this edge legal".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Fulfilled,
    Cancelled,
    Expired,
}

impl OrderStatus {
    /// Whether a manual transition from `self` to `next` is legal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (PendingPayment, Paid)
                | (PendingPayment, Cancelled)
                | (PendingPayment, Expired)
                | (Paid, Fulfilled)
                | (Cancelled, Paid)
                | (Expired, Paid)
        )
    }

    /// Whether an admin may delete an order in this state. Deletion is
    /// irreversible and independent of the transition table.
    pub fn is_deletable(self) -> bool {
        use OrderStatus::*;
        matches!(self, Fulfilled | Cancelled | Expired)
    }

    /// Wire name used by the external store ("pending_payment", ...).
    pub fn as_str(self) -> &'static str {
        use OrderStatus::*;
        match self {
            PendingPayment => "pending_payment",
            Paid => "paid",
            Fulfilled => "fulfilled",
            Cancelled => "cancelled",
            Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        use OrderStatus::*;
        match s {
            "pending_payment" => Some(PendingPayment),
            "paid" => Some(Paid),
            "fulfilled" => Some(Fulfilled),
            "cancelled" => Some(Cancelled),
            "expired" => Some(Expired),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order Code
// =============================================================================

/// Derives the 3-letter code prefix from a customer name.
///
/// First three alphabetic characters, uppercased. Names yielding fewer than
/// three letters (empty, numeric, emoji-only) fall back to `CUST`.
pub fn order_code_prefix(name: &str) -> String {
    let letters: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect();
    if letters.len() >= 3 {
        letters.to_ascii_uppercase()
    } else {
        FALLBACK_CODE_PREFIX.to_string()
    }
}

/// Generates a human-readable order code: `XXX-NNN`.
///
/// The suffix is drawn uniformly from [100, 999]. No collision check is
/// performed; the code is a human-facing reference for payment memos, not a
/// primary key.
pub fn generate_order_code(name: &str) -> String {
    use rand::Rng;
    let suffix: u32 = rand::thread_rng().gen_range(100..1000);
    format!("{}-{}", order_code_prefix(name), suffix)
}

// =============================================================================
// Composed Order
// =============================================================================

/// A submission-ready order: flat item list, code, totals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComposedOrder {
    /// Human-readable reference (`XXX-NNN`), advisory uniqueness only.
    pub order_code: String,

    /// Flat item list including the display-only bundle aggregate row.
    pub items: Vec<OrderLineItem>,

    /// Pre-discount cart subtotal (bundle excluded).
    pub subtotal: Money,

    /// Summed tier-deal savings.
    pub savings: Money,

    /// Bundle sale price, zero when no bundle was selected.
    pub bundle_total: Money,

    /// Delivery fee computed from the discount-adjusted subtotal.
    pub delivery_fee: Money,

    /// What the customer pays.
    pub total: Money,

    pub pickup: bool,
}

impl ComposedOrder {
    /// Lines the external transaction decrements stock for.
    pub fn stock_bearing_items(&self) -> impl Iterator<Item = &OrderLineItem> {
        self.items.iter().filter(|i| i.stock_bearing)
    }
}

/// Assembles a submission-ready order.
///
/// Errors on an empty submission, on cart lines that no longer resolve
/// against the catalog, and on a bundle selection that doesn't fill the
/// bundle exactly (the storefront only enables checkout on a complete pick).
pub fn compose_order(
    catalog: &Catalog,
    deals: &DealBook,
    delivery: &DeliveryPolicy,
    cart: &Cart,
    bundle_selection: &BundleSelection,
    customer_name: &str,
    pickup: bool,
) -> CoreResult<ComposedOrder> {
    if cart.is_empty() && bundle_selection.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut items = Vec::new();

    // Cart lines, one stock-bearing item each.
    for (key, qty) in cart.lines() {
        let (product, size) = catalog
            .resolve(key)
            .ok_or_else(|| CoreError::UnknownCartKey(key.clone()))?;
        items.push(OrderLineItem {
            sku: size.sku.clone(),
            name: format!("{} ({})", product.name, size.name),
            unit_price: size.price,
            quantity: qty,
            stock_bearing: true,
            bundle_component: false,
        });
    }

    // Bundle picks: stock-bearing component lines plus one aggregate row.
    let bundle = &deals.bundle;
    let mut bundle_total = Money::zero();
    if !bundle_selection.is_empty() {
        if !bundle_selection.is_complete(bundle) {
            return Err(CoreError::IncompleteBundle {
                selected: bundle_selection.total(),
                capacity: bundle.capacity,
            });
        }
        for (sku, qty) in bundle_selection.picks() {
            let component = bundle
                .component(sku)
                .ok_or_else(|| CoreError::SkuNotInBundle(sku.clone()))?;
            items.push(OrderLineItem {
                sku: component.sku.clone(),
                name: format!("{} ({})", component.name, component.size_name),
                unit_price: bundle.component_price,
                quantity: qty,
                stock_bearing: true,
                bundle_component: true,
            });
        }
        items.push(OrderLineItem {
            sku: bundle.sku.clone(),
            name: bundle.name.clone(),
            unit_price: bundle.sale_price,
            quantity: 1,
            stock_bearing: false,
            bundle_component: false,
        });
        bundle_total = bundle.sale_price;
    }

    let subtotal = cart.subtotal(catalog);
    let savings = deals.total_tier_savings(cart, catalog);
    let discounted_subtotal = subtotal - savings + bundle_total;
    let delivery_fee = delivery.fee(pickup, discounted_subtotal);

    Ok(ComposedOrder {
        order_code: generate_order_code(customer_name),
        items,
        subtotal,
        savings,
        bundle_total,
        delivery_fee,
        total: discounted_subtotal + delivery_fee,
        pickup,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CartKey;
    use crate::stock::StockSnapshot;

    fn fixtures() -> (Catalog, DealBook, DeliveryPolicy) {
        (
            Catalog::builtin(),
            DealBook::builtin(),
            DeliveryPolicy::default(),
        )
    }

    // -------------------------------------------------------------------------
    // Order code
    // -------------------------------------------------------------------------

    #[test]
    fn test_code_prefix_from_name() {
        assert_eq!(order_code_prefix("Harper Lee"), "HAR");
        assert_eq!(order_code_prefix("al b"), "ALB");
        assert_eq!(order_code_prefix("  liz  "), "LIZ");
    }

    #[test]
    fn test_code_prefix_fallback() {
        assert_eq!(order_code_prefix(""), "CUST");
        assert_eq!(order_code_prefix("42"), "CUST");
        assert_eq!(order_code_prefix("J9"), "CUST");
        assert_eq!(order_code_prefix("🍬🍬🍬"), "CUST");
    }

    #[test]
    fn test_code_format_for_hostile_names() {
        for name in ["", "42", "Harper Lee", "x", "ßßß", "O'Neil-7"] {
            let code = generate_order_code(name);
            let (prefix, suffix) = code.split_once('-').expect("dash separator");
            assert!(
                prefix == "CUST" || (prefix.len() == 3 && prefix.chars().all(|c| c.is_ascii_uppercase())),
                "bad prefix in {code}"
            );
            let n: u32 = suffix.parse().expect("numeric suffix");
            assert!((100..=999).contains(&n), "suffix out of range in {code}");
        }
    }

    // -------------------------------------------------------------------------
    // State machine
    // -------------------------------------------------------------------------

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;
        assert!(PendingPayment.can_transition_to(Paid));
        assert!(PendingPayment.can_transition_to(Cancelled));
        assert!(PendingPayment.can_transition_to(Expired));
        assert!(Paid.can_transition_to(Fulfilled));
        assert!(Cancelled.can_transition_to(Paid));
        assert!(Expired.can_transition_to(Paid));

        assert!(!Paid.can_transition_to(PendingPayment));
        assert!(!Fulfilled.can_transition_to(Paid));
        assert!(!PendingPayment.can_transition_to(Fulfilled));
        assert!(!Cancelled.can_transition_to(Fulfilled));
    }

    #[test]
    fn test_deletable_states() {
        use OrderStatus::*;
        assert!(Fulfilled.is_deletable());
        assert!(Cancelled.is_deletable());
        assert!(Expired.is_deletable());
        assert!(!PendingPayment.is_deletable());
        assert!(!Paid.is_deletable());
    }

    #[test]
    fn test_status_wire_round_trip() {
        use OrderStatus::*;
        for status in [PendingPayment, Paid, Fulfilled, Cancelled, Expired] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }

    // -------------------------------------------------------------------------
    // Composition
    // -------------------------------------------------------------------------

    /// 3 Large bags at $10 under "3 for $27", pickup:
    /// subtotal $30, savings $3, fee $0, total $27.
    #[test]
    fn test_compose_pickup_with_tier_deal() {
        let (catalog, deals, delivery) = fixtures();
        let mut cart = Cart::new();
        cart.set_quantity(CartKey::new("caramelts", "lrg"), 3);

        let order = compose_order(
            &catalog,
            &deals,
            &delivery,
            &cart,
            &BundleSelection::new(),
            "Harper",
            true,
        )
        .unwrap();

        assert_eq!(order.subtotal, Money::from_dollars(30));
        assert_eq!(order.savings, Money::from_dollars(3));
        assert_eq!(order.delivery_fee, Money::zero());
        assert_eq!(order.total, Money::from_dollars(27));
        assert_eq!(order.items.len(), 1);
        assert!(order.items[0].stock_bearing);
    }

    /// 4 Large bags: one tier plus one full-price bag, discounted $37.
    #[test]
    fn test_compose_tier_with_remainder() {
        let (catalog, deals, delivery) = fixtures();
        let mut cart = Cart::new();
        cart.set_quantity(CartKey::new("caramelts", "lrg"), 4);

        let order = compose_order(
            &catalog,
            &deals,
            &delivery,
            &cart,
            &BundleSelection::new(),
            "Harper",
            true,
        )
        .unwrap();

        assert_eq!(order.savings, Money::from_dollars(3));
        assert_eq!(order.total, Money::from_dollars(37));
    }

    /// Delivery order one cent under the $70 threshold pays the $15 fee.
    #[test]
    fn test_compose_delivery_fee_under_threshold() {
        let (catalog, deals, _) = fixtures();
        // A policy with a $69.99-reachable cart: 7 Regular bags at $8 with
        // the 2-for-$15 deal → 56 − 3 = $53; use a custom threshold to hit
        // the documented boundary exactly.
        let delivery = DeliveryPolicy {
            flat_fee: Money::from_dollars(15),
            free_threshold: Money::from_cents(5300) + Money::from_cents(1),
        };
        let mut cart = Cart::new();
        cart.set_quantity(CartKey::new("caramelts", "reg"), 7);

        let order = compose_order(
            &catalog,
            &deals,
            &delivery,
            &cart,
            &BundleSelection::new(),
            "Harper",
            false,
        )
        .unwrap();

        assert_eq!(order.subtotal, Money::from_dollars(56));
        assert_eq!(order.savings, Money::from_dollars(3));
        assert_eq!(order.delivery_fee, Money::from_dollars(15));
        assert_eq!(order.total, Money::from_dollars(68));
    }

    /// At the threshold the fee drops to zero.
    #[test]
    fn test_compose_free_delivery_at_threshold() {
        let (catalog, deals, _) = fixtures();
        let delivery = DeliveryPolicy {
            flat_fee: Money::from_dollars(15),
            free_threshold: Money::from_dollars(53),
        };
        let mut cart = Cart::new();
        cart.set_quantity(CartKey::new("caramelts", "reg"), 7); // $53 after deal

        let order = compose_order(
            &catalog,
            &deals,
            &delivery,
            &cart,
            &BundleSelection::new(),
            "Harper",
            false,
        )
        .unwrap();
        assert_eq!(order.delivery_fee, Money::zero());
    }

    #[test]
    fn test_compose_empty_cart_rejected() {
        let (catalog, deals, delivery) = fixtures();
        let err = compose_order(
            &catalog,
            &deals,
            &delivery,
            &Cart::new(),
            &BundleSelection::new(),
            "Harper",
            true,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_compose_unknown_line_rejected() {
        let (catalog, deals, delivery) = fixtures();
        let mut cart = Cart::new();
        cart.set_quantity(CartKey::new("discontinued", "lrg"), 1);
        let err = compose_order(
            &catalog,
            &deals,
            &delivery,
            &cart,
            &BundleSelection::new(),
            "Harper",
            true,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnknownCartKey(_)));
    }

    fn full_selection(deals: &DealBook) -> BundleSelection {
        let snapshot = StockSnapshot::from_pairs(
            deals
                .bundle
                .components
                .iter()
                .map(|c| (c.sku.clone(), 10)),
        );
        let mut selection = BundleSelection::new();
        for component in deals.bundle.components.iter().take(6) {
            selection
                .try_adjust(&deals.bundle, &snapshot, &component.sku, 1)
                .unwrap();
        }
        selection
    }

    /// A complete bundle emits 6 stock-bearing component lines plus exactly
    /// one display-only aggregate line priced at the bundle sale price.
    #[test]
    fn test_compose_bundle_lines() {
        let (catalog, deals, delivery) = fixtures();
        let selection = full_selection(&deals);

        let order = compose_order(
            &catalog,
            &deals,
            &delivery,
            &Cart::new(),
            &selection,
            "Harper",
            true,
        )
        .unwrap();

        let components: Vec<_> = order.items.iter().filter(|i| i.bundle_component).collect();
        let aggregates: Vec<_> = order.items.iter().filter(|i| !i.stock_bearing).collect();

        assert_eq!(components.len(), 6);
        assert!(components.iter().all(|i| i.stock_bearing));
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].sku, deals.bundle.sku);
        assert_eq!(aggregates[0].unit_price, deals.bundle.sale_price);
        assert_eq!(order.bundle_total, Money::from_dollars(50));
        assert_eq!(order.total, Money::from_dollars(50));

        // The decrement pass sees only the component lines.
        assert_eq!(order.stock_bearing_items().count(), 6);
    }

    #[test]
    fn test_compose_incomplete_bundle_rejected() {
        let (catalog, deals, delivery) = fixtures();
        let snapshot = StockSnapshot::from_pairs(
            deals.bundle.components.iter().map(|c| (c.sku.clone(), 10)),
        );
        let mut selection = BundleSelection::new();
        selection
            .try_adjust(&deals.bundle, &snapshot, &deals.bundle.components[0].sku, 2)
            .unwrap();

        let err = compose_order(
            &catalog,
            &deals,
            &delivery,
            &Cart::new(),
            &selection,
            "Harper",
            true,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::IncompleteBundle {
                selected: 2,
                capacity: 6
            }
        ));
    }

    /// Bundle total counts toward the free-delivery threshold.
    #[test]
    fn test_bundle_counts_toward_free_delivery() {
        let (catalog, deals, _) = fixtures();
        let delivery = DeliveryPolicy {
            flat_fee: Money::from_dollars(15),
            free_threshold: Money::from_dollars(50),
        };
        let selection = full_selection(&deals);

        let order = compose_order(
            &catalog,
            &deals,
            &delivery,
            &Cart::new(),
            &selection,
            "Harper",
            false,
        )
        .unwrap();
        assert_eq!(order.delivery_fee, Money::zero());
        assert_eq!(order.total, Money::from_dollars(50));
    }
}
