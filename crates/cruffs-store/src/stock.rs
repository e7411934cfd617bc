//! # Stock Ledger
//!
//! Snapshot reads of the stock table and direct admin point-writes.
//!
//! The ledger is owned exclusively by the external store. It is mutated only
//! by the two transactional procedures (place_order, admin_release_stock) and
//! by the admin point-writes below; the storefront cart logic never writes
//! stock.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use cruffs_core::{Sku, StockSnapshot};

use crate::error::{StoreError, StoreResult};

/// Read access to the external stock table.
///
/// A trait rather than a concrete type so the read-through cache and the
/// handler tests can run against an in-memory fake.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Retrieves the full current stock table.
    async fn fetch_snapshot(&self) -> StoreResult<StockSnapshot>;
}

/// The real ledger: `products (sku, stock_qty)` in the managed store.
#[derive(Debug, Clone)]
pub struct PgStockLedger {
    pool: PgPool,
}

impl PgStockLedger {
    pub fn new(pool: PgPool) -> Self {
        PgStockLedger { pool }
    }

    /// Admin point-write: adjust one SKU's stock by a delta, clamped at zero.
    ///
    /// Returns the new quantity. The row update fires the stock change
    /// notification, so every subscribed cache refetches.
    pub async fn adjust(&self, sku: &Sku, delta: i64) -> StoreResult<i64> {
        debug!(sku = %sku, delta, "Adjusting stock");

        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE products
             SET stock_qty = GREATEST(stock_qty + $2, 0)
             WHERE sku = $1
             RETURNING stock_qty",
        )
        .bind(sku.as_str())
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((qty,)) => Ok(qty),
            None => Err(StoreError::NotFound {
                entity: "product",
                id: sku.to_string(),
            }),
        }
    }
}

#[async_trait]
impl StockLedger for PgStockLedger {
    async fn fetch_snapshot(&self) -> StoreResult<StockSnapshot> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT sku, stock_qty FROM products WHERE sku IS NOT NULL")
                .fetch_all(&self.pool)
                .await?;

        Ok(StockSnapshot::from_pairs(
            rows.into_iter().map(|(sku, qty)| (Sku::new(sku), qty)),
        ))
    }
}
