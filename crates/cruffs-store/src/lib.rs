//! # cruffs-store: Datastore Client
//!
//! Everything that touches the external managed PostgreSQL store: the stock
//! snapshot query and change feed, order reads and status transitions, and
//! the two transactional procedures (`place_order`, `admin_release_stock`)
//! that are the only authoritative stock operations in the system.
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool and the [`Store`] facade
//! - [`stock`] - [`StockLedger`] trait + Postgres implementation, admin
//!   point-writes
//! - [`cache`] - Read-through [`StockCache`] with LISTEN/NOTIFY refresh
//! - [`orders`] - [`OrderRepository`] for the admin console
//! - [`gateway`] - [`OrderGateway`] trait + Postgres implementation
//! - [`error`] - Store error taxonomy (stock conflicts stay distinguishable)

pub mod cache;
pub mod error;
pub mod gateway;
pub mod orders;
pub mod pool;
pub mod stock;

pub use cache::{run_stock_feed, StockCache, StockSubscription, STOCK_CHANNEL};
pub use error::{StoreError, StoreResult};
pub use gateway::{OrderGateway, PgOrderGateway};
pub use orders::{OrderRecord, OrderRepository};
pub use pool::{Store, StoreConfig};
pub use stock::{PgStockLedger, StockLedger};
