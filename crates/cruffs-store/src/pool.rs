//! # Database Pool Management
//!
//! Connection pool creation for the external managed PostgreSQL store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Connection Pool                              │
//! │                                                                         │
//! │  shop-api startup                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::new(url) ← Configure pool settings                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::connect(config).await ← Create PgPool                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store ──► stock()    PgStockLedger   (snapshot reads, point-writes)   │
//! │        ──► orders()   OrderRepository (admin reads & transitions)      │
//! │        ──► gateway()  PgOrderGateway  (place_order / release_stock)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No migrations run here: the managed store owns its schema and the
//! transactional procedures.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::gateway::PgOrderGateway;
use crate::orders::OrderRepository;
use crate::stock::PgStockLedger;

// =============================================================================
// Configuration
// =============================================================================

/// Datastore connection configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection string.
    pub database_url: String,

    /// Maximum number of connections in the pool.
    /// Default: 5 (a thin backend for a small storefront)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    pub min_connections: u32,

    /// How long to wait for a connection before giving up.
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        StoreConfig {
            database_url: database_url.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

// =============================================================================
// Store Facade
// =============================================================================

/// Handle to the external store: owns the pool, hands out repositories.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connects to the store and verifies the connection.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Connected to datastore"
        );

        Ok(Store { pool })
    }

    /// Wraps an existing pool (tests, shared pools).
    pub fn from_pool(pool: PgPool) -> Self {
        Store { pool }
    }

    /// The underlying pool, for the stock feed's LISTEN connection.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Stock ledger reads and admin point-writes.
    pub fn stock(&self) -> PgStockLedger {
        PgStockLedger::new(self.pool.clone())
    }

    /// Order reads and status transitions for the admin console.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// The transactional order gateway.
    pub fn gateway(&self) -> PgOrderGateway {
        PgOrderGateway::new(self.pool.clone())
    }
}
