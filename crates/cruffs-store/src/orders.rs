//! # Order Repository
//!
//! Admin-console reads and status transitions for order rows.
//!
//! ## Order Lifecycle (as driven from here)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  place_order (gateway) ──► pending_payment                             │
//! │                                 │                                       │
//! │     mark_paid() ────────────────┼──► paid ──► mark_fulfilled()         │
//! │     admin_release_stock (gw) ───┼──► cancelled                         │
//! │     expiry job (external) ──────┴──► expired                           │
//! │                                                                         │
//! │     reopen() : cancelled/expired ──► paid, re-applying the stock       │
//! │                decrement the release had restored                      │
//! │     delete() : terminal states only, irreversible                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition is checked against the core state machine before the
//! UPDATE is issued; the store itself does not police edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use cruffs_core::{OrderLineItem, OrderStatus};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Records
// =============================================================================

/// One order row as held by the external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub order_code: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    /// "pickup" or "delivery".
    pub delivery_type: String,
    pub address: Option<String>,
    pub items: Vec<OrderLineItem>,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Raw row shape; status arrives as text from the store.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_code: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    delivery_type: String,
    address: Option<String>,
    items: Json<Vec<OrderLineItem>>,
    total_cents: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_record(self) -> StoreResult<OrderRecord> {
        let status = OrderStatus::parse(&self.status).ok_or_else(|| {
            StoreError::QueryFailed(format!("unknown order status '{}'", self.status))
        })?;
        Ok(OrderRecord {
            id: self.id,
            order_code: self.order_code,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            delivery_type: self.delivery_type,
            address: self.address,
            items: self.items.0,
            total_cents: self.total_cents,
            status,
            created_at: self.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_code, customer_name, customer_email, customer_phone, \
     delivery_type, address, items, total_cents, status, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order reads and status transitions.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        OrderRepository { pool }
    }

    /// Orders in a given status, newest first.
    pub async fn list_by_status(&self, status: OrderStatus) -> StoreResult<Vec<OrderRecord>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_record).collect()
    }

    /// Gets one order by id.
    pub async fn get(&self, id: Uuid) -> StoreResult<OrderRecord> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or_else(|| StoreError::NotFound {
            entity: "order",
            id: id.to_string(),
        })?
        .into_record()
    }

    /// Moves an order along a legal state-machine edge.
    ///
    /// Stock is untouched: transitions that move stock (cancel, reopen) have
    /// their own paths.
    pub async fn transition(&self, id: Uuid, to: OrderStatus) -> StoreResult<OrderRecord> {
        let order = self.get(id).await?;
        if !order.status.can_transition_to(to) {
            return Err(StoreError::InvalidTransition {
                order_id: id.to_string(),
                from: order.status,
                to,
            });
        }

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(to.as_str())
            .execute(&self.pool)
            .await?;

        info!(order_id = %id, code = %order.order_code, from = %order.status, to = %to, "Order transitioned");
        Ok(OrderRecord {
            status: to,
            ..order
        })
    }

    /// Marks a pending order as paid.
    pub async fn mark_paid(&self, id: Uuid) -> StoreResult<OrderRecord> {
        self.transition(id, OrderStatus::Paid).await
    }

    /// Marks a paid order as fulfilled.
    pub async fn mark_fulfilled(&self, id: Uuid) -> StoreResult<OrderRecord> {
        self.transition(id, OrderStatus::Fulfilled).await
    }

    /// Reopens a cancelled/expired order back to paid, re-applying the stock
    /// decrement its cancellation had released.
    ///
    /// Decrement and status change happen in one transaction. Idempotency is
    /// the caller's responsibility: reopening twice decrements twice.
    pub async fn reopen(&self, id: Uuid) -> StoreResult<OrderRecord> {
        let order = self.get(id).await?;
        if !order.status.can_transition_to(OrderStatus::Paid) {
            return Err(StoreError::InvalidTransition {
                order_id: id.to_string(),
                from: order.status,
                to: OrderStatus::Paid,
            });
        }

        let mut tx = self.pool.begin().await?;

        for item in order.items.iter().filter(|i| i.stock_bearing) {
            sqlx::query(
                "UPDATE products SET stock_qty = GREATEST(stock_qty - $2, 0) WHERE sku = $1",
            )
            .bind(item.sku.as_str())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(OrderStatus::Paid.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(order_id = %id, code = %order.order_code, "Order reopened, stock re-applied");
        Ok(OrderRecord {
            status: OrderStatus::Paid,
            ..order
        })
    }

    /// Deletes a terminal order. Irreversible, independent of the
    /// transition table.
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let order = self.get(id).await?;
        if !order.status.is_deletable() {
            return Err(StoreError::NotDeletable {
                order_id: id.to_string(),
                status: order.status,
            });
        }

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(order_id = %id, code = %order.order_code, "Order deleted");
        Ok(())
    }
}
