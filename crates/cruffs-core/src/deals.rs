//! # Deal Engine
//!
//! Pure, side-effect-free pricing functions: tiered mix-and-match discounts,
//! customizable-bundle feasibility and accounting, and the free-delivery
//! threshold.
//!
//! ## How money moves through a cart
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Deal Engine Data Flow                             │
//! │                                                                         │
//! │  Cart lines ────► tier_discount(deal A) ─┐                             │
//! │             └───► tier_discount(deal B) ─┼──► savings sum             │
//! │                                          │                              │
//! │  Bundle selection ──► bundle sale price ─┤                              │
//! │                                          ▼                              │
//! │  subtotal − savings + bundle ──► DeliveryPolicy::fee ──► order total   │
//! │                                                                         │
//! │  Everything here is ADVISORY pricing/UX. The authoritative stock gate  │
//! │  is the external place_order transaction.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multiple active tier deals are evaluated independently over their own
//! eligible pools and their savings sum. A line that satisfies two deals'
//! predicates is counted by both; see DESIGN.md for why that is left as-is.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::catalog::{Catalog, Size, Sku};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stock::StockSnapshot;
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// Tiered Mix-and-Match Deals
// =============================================================================

/// Configuration for one tiered mix-and-match deal ("3 for $27").
///
/// Eligibility is a disjunction: a size qualifies when its name matches
/// `eligible_size_name` OR its unit price matches `eligible_price`. That is
/// how "any Large bag or any $10 item" is expressed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierDeal {
    /// Stable deal id ("mix-match-3-for-27").
    pub id: String,

    /// Display name ("Stock Up & Save").
    pub name: String,

    /// Size name that qualifies ("Large").
    pub eligible_size_name: String,

    /// Unit price that qualifies independently of size name.
    pub eligible_price: Money,

    /// Regular per-item price used in the savings arithmetic.
    pub regular_price: Money,

    /// Items per full tier (3 in "3 for $27").
    pub required_quantity: i64,

    /// Price of one full tier ($27 in "3 for $27").
    pub tier_price: Money,

    /// Inactive deals compute zero savings.
    pub active: bool,
}

impl TierDeal {
    /// Whether a size qualifies for this deal.
    pub fn is_eligible(&self, size: &Size) -> bool {
        self.active && (size.name == self.eligible_size_name || size.price == self.eligible_price)
    }

    /// Savings for one full tier, for display ("save $3").
    pub fn savings_per_tier(&self) -> Money {
        self.regular_price.multiply_quantity(self.required_quantity) - self.tier_price
    }
}

/// Result of evaluating one tier deal over a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierDiscount {
    /// Total savings versus regular pricing. Zero when no full tier formed.
    pub savings: Money,

    /// Number of complete tiers the eligible items form.
    pub full_tiers: i64,

    /// Eligible items counted across the cart.
    pub eligible_count: i64,
}

impl TierDiscount {
    pub const fn none() -> Self {
        TierDiscount {
            savings: Money::zero(),
            full_tiers: 0,
            eligible_count: 0,
        }
    }
}

/// Evaluates one tier deal over a cart.
///
/// Bundle components never appear in the cart (they live in
/// [`BundleSelection`]), so bundle rows are structurally excluded from the
/// eligible pool.
///
/// The arithmetic, for `n` eligible items, tier size `t`, tier price `d` and
/// regular price `r`:
/// ```text
/// full_tiers = n / t          (integer division)
/// remainder  = n % t
/// savings    = n*r − (full_tiers*d + remainder*r)
/// ```
pub fn tier_discount(cart: &Cart, catalog: &Catalog, deal: &TierDeal) -> TierDiscount {
    if !deal.active {
        return TierDiscount::none();
    }

    let eligible_count: i64 = cart
        .lines()
        .filter_map(|(key, qty)| {
            catalog
                .resolve(key)
                .filter(|(_, size)| deal.is_eligible(size))
                .map(|_| qty)
        })
        .sum();

    let full_tiers = eligible_count / deal.required_quantity;
    let remainder = eligible_count % deal.required_quantity;

    let normal_price = deal.regular_price.multiply_quantity(eligible_count);
    let deal_price = deal.tier_price.multiply_quantity(full_tiers)
        + deal.regular_price.multiply_quantity(remainder);

    TierDiscount {
        savings: normal_price - deal_price,
        full_tiers,
        eligible_count,
    }
}

// =============================================================================
// Customizable Bundle
// =============================================================================

/// One product eligible as a bundle component.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BundleComponent {
    pub product_id: String,
    pub sku: Sku,
    pub name: String,
    pub size_name: String,
}

/// Configuration for the customizable "pick N" bundle.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BundleConfig {
    /// Stable bundle id ("full-collection-bundle").
    pub id: String,

    /// SKU of the synthetic aggregate line. Display-only: the external
    /// transaction never decrements this SKU.
    pub sku: Sku,

    /// Display name ("The Crunch Jackpot").
    pub name: String,

    /// Sum of the components at regular pricing, for display.
    pub original_price: Money,

    /// What the customer actually pays for a complete bundle.
    pub sale_price: Money,

    /// Fixed item cap across all selected components.
    pub capacity: u32,

    /// Component unit price recorded on stock-bearing bundle lines.
    pub component_price: Money,

    /// Products that may fill the bundle.
    pub components: Vec<BundleComponent>,

    pub active: bool,
}

impl BundleConfig {
    /// Savings versus regular pricing, for display.
    pub fn savings(&self) -> Money {
        self.original_price - self.sale_price
    }

    /// Whether a SKU belongs to the eligible component set.
    pub fn is_component(&self, sku: &Sku) -> bool {
        self.components.iter().any(|c| &c.sku == sku)
    }

    pub fn component(&self, sku: &Sku) -> Option<&BundleComponent> {
        self.components.iter().find(|c| &c.sku == sku)
    }
}

/// Whether the bundle can currently be offered at all.
///
/// True iff the total stock across all eligible component SKUs covers the
/// bundle capacity. Necessary but not sufficient: stock concentrated in one
/// SKU can still defeat a specific pick at submission time, which is fine
/// because the external transaction is the real gate.
pub fn is_bundle_available(snapshot: &StockSnapshot, bundle: &BundleConfig) -> bool {
    if !bundle.active {
        return false;
    }
    let total: i64 = bundle
        .components
        .iter()
        .map(|c| snapshot.level(&c.sku).max(0))
        .sum();
    total >= bundle.capacity as i64
}

/// The customer's picks for one customizable bundle: SKU → quantity.
///
/// Same lifecycle as the cart: ephemeral, destroyed on submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleSelection {
    quantities: std::collections::HashMap<Sku, i64>,
}

impl BundleSelection {
    pub fn new() -> Self {
        BundleSelection::default()
    }

    /// Rebuilds a selection from raw (sku, quantity) pairs, as received in a
    /// submission payload. Quantities are clamped to [`MAX_LINE_QUANTITY`]
    /// the same way cart lines are, which also keeps `total()` safely inside
    /// i64 for hostile payloads. No stock or capacity checks happen here:
    /// completeness is enforced at composition, stock at the external
    /// transaction.
    pub fn from_picks(picks: impl IntoIterator<Item = (Sku, i64)>) -> Self {
        BundleSelection {
            quantities: picks
                .into_iter()
                .map(|(sku, q)| (sku, q.min(MAX_LINE_QUANTITY)))
                .filter(|(_, q)| *q > 0)
                .collect(),
        }
    }

    /// Total items picked across all SKUs.
    pub fn total(&self) -> i64 {
        self.quantities.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Whether the selection fills the bundle exactly.
    pub fn is_complete(&self, bundle: &BundleConfig) -> bool {
        self.total() == bundle.capacity as i64
    }

    pub fn quantity(&self, sku: &Sku) -> i64 {
        self.quantities.get(sku).copied().unwrap_or(0)
    }

    /// Iterates picked (sku, quantity) pairs with quantity > 0.
    pub fn picks(&self) -> impl Iterator<Item = (&Sku, i64)> {
        self.quantities
            .iter()
            .filter(|(_, q)| **q > 0)
            .map(|(sku, q)| (sku, *q))
    }

    /// Applies a delta to one SKU's pick count.
    ///
    /// Rejected locally when the resulting quantity would exceed the SKU's
    /// level in the given snapshot, or the running total would exceed the
    /// bundle capacity. Both checks are advisory UX; final enforcement is
    /// the external transaction.
    pub fn try_adjust(
        &mut self,
        bundle: &BundleConfig,
        snapshot: &StockSnapshot,
        sku: &Sku,
        delta: i64,
    ) -> CoreResult<()> {
        if !bundle.is_component(sku) {
            return Err(CoreError::SkuNotInBundle(sku.clone()));
        }

        let next = (self.quantity(sku) + delta).max(0);

        if delta > 0 {
            let available = snapshot.level(sku);
            if next > available {
                return Err(CoreError::BundleOverStock {
                    sku: sku.clone(),
                    available,
                    requested: next,
                });
            }
            let next_total = self.total() - self.quantity(sku) + next;
            if next_total > bundle.capacity as i64 {
                return Err(CoreError::BundleOverCapacity {
                    capacity: bundle.capacity,
                });
            }
        }

        if next == 0 {
            self.quantities.remove(sku);
        } else {
            self.quantities.insert(sku.clone(), next);
        }
        Ok(())
    }
}

// =============================================================================
// Free Delivery Threshold
// =============================================================================

/// Flat delivery fee with a free-delivery threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryPolicy {
    /// Flat fee charged on delivery orders under the threshold.
    pub flat_fee: Money,

    /// Discount-adjusted subtotals at or above this ship free.
    pub free_threshold: Money,
}

impl DeliveryPolicy {
    /// Fee for an order.
    ///
    /// `subtotal_after_discounts` is the discount-adjusted subtotal
    /// (including bundle totals), NOT the pre-discount subtotal. The
    /// comparison is `>=`: hitting the threshold exactly ships free.
    pub fn fee(&self, pickup: bool, subtotal_after_discounts: Money) -> Money {
        if pickup || subtotal_after_discounts >= self.free_threshold {
            Money::zero()
        } else {
            self.flat_fee
        }
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        DeliveryPolicy {
            flat_fee: Money::from_dollars(15),
            free_threshold: Money::from_dollars(70),
        }
    }
}

// =============================================================================
// Deal Book
// =============================================================================

/// Every deal configuration active in the storefront.
#[derive(Debug, Clone)]
pub struct DealBook {
    pub tier_deals: Vec<TierDeal>,
    pub bundle: BundleConfig,
}

impl DealBook {
    /// Sums the savings of every active tier deal over a cart.
    ///
    /// Deals are evaluated independently over their own eligible pools; no
    /// de-duplication across deals is attempted.
    pub fn total_tier_savings(&self, cart: &Cart, catalog: &Catalog) -> Money {
        self.tier_deals
            .iter()
            .map(|deal| tier_discount(cart, catalog, deal).savings)
            .fold(Money::zero(), |acc, s| acc + s)
    }

    /// The deal configuration shipped with the deployed artifact.
    pub fn builtin() -> Self {
        let catalog = Catalog::builtin();

        // Every Large bag plus the two single-size $10 pop bags.
        let components = [
            ("shark-bite-crunch", "lrg"),
            ("neon-worm-crisps", "lrg"),
            ("crystal-bear-bites", "lrg"),
            ("cola-fizz-crunch", "lrg"),
            ("prism-pops", "std"),
            ("strawberry-sparkle-crunch", "lrg"),
            ("caramelts", "lrg"),
            ("sour-prism-pops", "std"),
        ]
        .iter()
        .map(|(product_id, size_id)| {
            let product = catalog
                .product(product_id)
                .unwrap_or_else(|| panic!("builtin bundle references unknown product {product_id}"));
            let size = product
                .size(size_id)
                .unwrap_or_else(|| panic!("builtin bundle references unknown size {size_id}"));
            BundleComponent {
                product_id: product.id.clone(),
                sku: size.sku.clone(),
                name: product.name.clone(),
                size_name: size.name.clone(),
            }
        })
        .collect();

        DealBook {
            tier_deals: vec![
                // "Stock Up & Save": any 3 Large bags or $10 items for $27.
                TierDeal {
                    id: "mix-match-3-for-27".to_string(),
                    name: "Stock Up & Save".to_string(),
                    eligible_size_name: "Large".to_string(),
                    eligible_price: Money::from_dollars(10),
                    regular_price: Money::from_dollars(10),
                    required_quantity: 3,
                    tier_price: Money::from_dollars(27),
                    active: true,
                },
                // "Double Up": any 2 Regular bags for $15.
                TierDeal {
                    id: "regular-2-for-15".to_string(),
                    name: "Double Up".to_string(),
                    eligible_size_name: "Regular".to_string(),
                    eligible_price: Money::from_dollars(8),
                    regular_price: Money::from_dollars(8),
                    required_quantity: 2,
                    tier_price: Money::from_dollars(15),
                    active: true,
                },
            ],
            bundle: BundleConfig {
                id: "full-collection-bundle".to_string(),
                sku: Sku::from("FULL-COLLECTION-BUNDLE"),
                name: "The Crunch Jackpot".to_string(),
                original_price: Money::from_dollars(60),
                sale_price: Money::from_dollars(50),
                capacity: 6,
                component_price: Money::from_dollars(10),
                components,
                active: true,
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
