//! # Order Submission Gateway
//!
//! Invokes the external atomic transactions: `place_order` and
//! `admin_release_stock`. Both are stored procedures owned by the managed
//! store; this module only calls them and interprets the outcome.
//!
//! ## The One Serialization Point
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                place_order (inside the managed store)                   │
//! │                                                                         │
//! │  one atomicity unit:                                                   │
//! │    1. verify stock for EVERY stock-bearing item                        │
//! │    2. decrement stock                                                  │
//! │    3. insert order row (pending_payment)                               │
//! │                                                                         │
//! │  any item short ──► whole transaction fails, NO partial decrement,     │
//! │                     surfaced here as StoreError::InsufficientStock     │
//! │                                                                         │
//! │  Concurrent clients race HERE and only here. Everything client-side    │
//! │  (snapshots, deal math, bundle checks) is advisory.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use cruffs_core::{ComposedOrder, CustomerInfo, OrderLineItem};

use crate::error::StoreResult;

// =============================================================================
// Gateway Trait
// =============================================================================

/// The transactional seam between the storefront and the managed store.
///
/// A trait so submission handlers can be exercised against a recording fake:
/// the interesting behavior (conflict mapping, notification decoupling) lives
/// on this side of the seam.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Invokes the atomic place-order transaction.
    ///
    /// Returns the new order row's id. Insufficient stock for ANY
    /// stock-bearing item fails the whole call with
    /// [`crate::StoreError::InsufficientStock`] and decrements nothing;
    /// every other error is generic and likewise guarantees no order row
    /// was created.
    async fn place_order(&self, order: &ComposedOrder, customer: &CustomerInfo)
        -> StoreResult<Uuid>;

    /// Invokes the atomic stock-release transaction: restores stock for
    /// every stock-bearing item on the order and marks it cancelled.
    async fn release_stock(&self, order_id: Uuid) -> StoreResult<()>;
}

// =============================================================================
// Postgres Implementation
// =============================================================================

/// Wire shape of one item as `place_order` expects it in its jsonb array.
#[derive(Debug, Serialize)]
struct WireItem<'a> {
    sku: &'a str,
    name: &'a str,
    quantity: i64,
    price_cents: i64,
    /// Lines with this flag false (the bundle aggregate row) are skipped by
    /// the procedure's decrement pass but stored for display.
    stock_bearing: bool,
}

impl<'a> From<&'a OrderLineItem> for WireItem<'a> {
    fn from(item: &'a OrderLineItem) -> Self {
        WireItem {
            sku: item.sku.as_str(),
            name: &item.name,
            quantity: item.quantity,
            price_cents: item.unit_price.cents(),
            stock_bearing: item.stock_bearing,
        }
    }
}

/// Gateway backed by the managed store's stored procedures.
#[derive(Debug, Clone)]
pub struct PgOrderGateway {
    pool: PgPool,
}

impl PgOrderGateway {
    pub fn new(pool: PgPool) -> Self {
        PgOrderGateway { pool }
    }
}

#[async_trait]
impl OrderGateway for PgOrderGateway {
    async fn place_order(
        &self,
        order: &ComposedOrder,
        customer: &CustomerInfo,
    ) -> StoreResult<Uuid> {
        let items: Vec<WireItem<'_>> = order.items.iter().map(WireItem::from).collect();
        let delivery_type = if customer.is_pickup() {
            "pickup"
        } else {
            "delivery"
        };

        let (order_id,): (Uuid,) = sqlx::query_as(
            "SELECT place_order($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Json(items))
        .bind(customer.name.trim())
        .bind(customer.email.trim())
        .bind(customer.phone.trim())
        .bind(&order.order_code)
        .bind(order.total.cents())
        .bind(delivery_type)
        .bind(customer.address.as_deref())
        .fetch_one(&self.pool)
        .await?;

        info!(
            order_id = %order_id,
            code = %order.order_code,
            total = %order.total,
            items = order.items.len(),
            "Order placed"
        );
        Ok(order_id)
    }

    async fn release_stock(&self, order_id: Uuid) -> StoreResult<()> {
        sqlx::query("SELECT admin_release_stock($1)")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        info!(order_id = %order_id, "Stock released, order cancelled");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cruffs_core::{Money, Sku};

    #[test]
    fn test_wire_item_shape() {
        let item = OrderLineItem {
            sku: Sku::from("CARAMELTS-LRG"),
            name: "Caramelts (Large)".to_string(),
            unit_price: Money::from_dollars(10),
            quantity: 3,
            stock_bearing: true,
            bundle_component: false,
        };

        let wire = WireItem::from(&item);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sku": "CARAMELTS-LRG",
                "name": "Caramelts (Large)",
                "quantity": 3,
                "price_cents": 1000,
                "stock_bearing": true,
            })
        );
    }

    /// The aggregate bundle row crosses the wire flagged as display-only.
    #[test]
    fn test_aggregate_row_is_not_stock_bearing_on_wire() {
        let item = OrderLineItem {
            sku: Sku::from("FULL-COLLECTION-BUNDLE"),
            name: "The Crunch Jackpot".to_string(),
            unit_price: Money::from_dollars(50),
            quantity: 1,
            stock_bearing: false,
            bundle_component: false,
        };
        let json = serde_json::to_value(WireItem::from(&item)).unwrap();
        assert_eq!(json["stock_bearing"], serde_json::json!(false));
    }
}
