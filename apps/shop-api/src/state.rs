//! Shared application state handed to every handler.

use std::sync::Arc;

use cruffs_core::{Catalog, DealBook, DeliveryPolicy, DeliveryZone};
use cruffs_notify::Notifier;
use cruffs_store::{OrderGateway, OrderRepository, PgStockLedger, StockCache};

use crate::config::ApiConfig;

/// Everything a handler can reach. Cheap to clone: all heavy members are
/// shared behind Arcs or pools.
#[derive(Clone)]
pub struct AppState {
    /// Static reference data shipped with the binary.
    pub catalog: Arc<Catalog>,
    pub deals: Arc<DealBook>,

    /// Deployment-configured pricing seam.
    pub delivery: DeliveryPolicy,
    pub zone: Arc<DeliveryZone>,

    /// Read-through stock snapshot, driven by the change feed.
    pub stock: StockCache,

    /// The transactional seam, injectable for handler tests.
    pub gateway: Arc<dyn OrderGateway>,

    /// Admin-console order access.
    pub orders: OrderRepository,

    /// Admin stock point-writes.
    pub ledger: PgStockLedger,

    /// Fire-and-forget email relay queue.
    pub notifier: Notifier,

    pub admin_token: Arc<String>,
}

impl AppState {
    pub fn new(
        config: &ApiConfig,
        stock: StockCache,
        gateway: Arc<dyn OrderGateway>,
        orders: OrderRepository,
        ledger: PgStockLedger,
        notifier: Notifier,
    ) -> Self {
        AppState {
            catalog: Arc::new(Catalog::builtin()),
            deals: Arc::new(DealBook::builtin()),
            delivery: config.delivery_policy(),
            zone: Arc::new(config.delivery_zone()),
            stock,
            gateway,
            orders,
            ledger,
            notifier,
            admin_token: Arc::new(config.admin_token.clone()),
        }
    }
}
