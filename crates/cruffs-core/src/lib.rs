//! # cruffs-core: Pure Business Logic for the Cruffs Shop storefront
//!
//! This crate is the **heart** of the shop. It contains all pricing and
//! inventory-allocation logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cruffs Shop Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Web Storefront (out of tree)                   │   │
//! │  │   Catalog UI ──► Cart UI ──► Bundle Picker ──► Checkout        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (apps/shop-api)                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cruffs-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌───────┐ ┌───────┐ ┌─────────┐ ┌────────────┐ │   │
//! │  │   │ catalog  │ │ money │ │ deals │ │  order  │ │ validation │ │   │
//! │  │   │ Product  │ │ Money │ │ tiers │ │ compose │ │   rules    │ │   │
//! │  │   │  Size    │ │ cents │ │bundle │ │  code   │ │   checks   │ │   │
//! │  │   └──────────┘ └───────┘ └───────┘ └─────────┘ └────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         cruffs-store (external managed PostgreSQL)              │   │
//! │  │   stock snapshot + feed, place_order / admin_release_stock      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Static product/size/SKU reference data
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`stock`] - The read-through stock snapshot type
//! - [`cart`] - Ephemeral cart keyed by explicit (product, size) structs
//! - [`deals`] - Tier discounts, bundle accounting, free-delivery threshold
//! - [`order`] - Order composition, order codes, status state machine
//! - [`adjustment`] - Optimistic admin stock adjustment command
//! - [`validation`] - Checkout input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic modulo the order
//!    code's random suffix
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Advisory locals, authoritative transaction**: nothing in this crate
//!    gates stock for correctness; only the external place_order procedure
//!    does
//!
//! ## Example Usage
//!
//! ```rust
//! use cruffs_core::cart::Cart;
//! use cruffs_core::catalog::{Catalog, CartKey};
//! use cruffs_core::deals::{DealBook, tier_discount};
//! use cruffs_core::money::Money;
//!
//! let catalog = Catalog::builtin();
//! let deals = DealBook::builtin();
//!
//! let mut cart = Cart::new();
//! cart.set_quantity(CartKey::new("caramelts", "lrg"), 3);
//!
//! // 3 Large bags at $10 under "3 for $27" save $3.
//! let discount = tier_discount(&cart, &catalog, &deals.tier_deals[0]);
//! assert_eq!(discount.savings, Money::from_dollars(3));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adjustment;
pub mod cart;
pub mod catalog;
pub mod deals;
pub mod error;
pub mod money;
pub mod order;
pub mod stock;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cruffs_core::Money` instead of
// `use cruffs_core::money::Money`

pub use adjustment::{AdjustmentState, StockAdjustment};
pub use cart::Cart;
pub use catalog::{Catalog, CartKey, Product, Size, Sku};
pub use deals::{
    is_bundle_available, tier_discount, BundleConfig, BundleSelection, DealBook, DeliveryPolicy,
    TierDeal, TierDiscount,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{
    compose_order, generate_order_code, ComposedOrder, OrderLineItem, OrderStatus,
};
pub use stock::StockSnapshot;
pub use validation::{validate_customer, validate_delivery, CustomerInfo, DeliveryType, DeliveryZone};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Order code prefix used when the customer name yields fewer than three
/// alphabetic characters.
pub const FALLBACK_CODE_PREFIX: &str = "CUST";

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 100 instead of 10) from a
/// small-batch storefront that rarely holds more than a few dozen bags of
/// anything.
pub const MAX_LINE_QUANTITY: i64 = 99;
