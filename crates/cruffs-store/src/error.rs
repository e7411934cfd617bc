//! # Store Error Types
//!
//! Error types for datastore operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL Error (sqlx::Error)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context; picks the INSUFFICIENT       │
//! │       │                      STOCK rejection out of the pile           │
//! │       ▼                                                                 │
//! │  ApiError (in shop-api) ← Serialized for the storefront                │
//! │                                                                         │
//! │  The insufficient-stock path MUST stay distinguishable end to end:     │
//! │  the storefront tells the customer to refresh, not to retry blindly.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use cruffs_core::OrderStatus;

/// Datastore operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The place_order transaction rejected the submission because at least
    /// one stock-bearing item could not be covered. Nothing was decremented
    /// and no order row exists.
    #[error("Insufficient stock: {detail}")]
    InsufficientStock { detail: String },

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A requested status change is not a legal edge of the order state
    /// machine.
    #[error("Order {order_id} is {from}, cannot move to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Deleting an order that is not in a terminal state.
    #[error("Order {order_id} is {status}, only fulfilled/cancelled/expired orders can be deleted")]
    NotDeletable {
        order_id: String,
        status: OrderStatus,
    },

    /// Connection-level failure (pool exhausted, network down).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed for any other reason. For order submission
    /// this still guarantees no order was created: the procedure is atomic.
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl StoreError {
    /// Whether this is the distinguished stock-conflict rejection.
    pub fn is_stock_conflict(&self) -> bool {
        matches!(self, StoreError::InsufficientStock { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => {
                // The place_order procedure raises with an INSUFFICIENT_STOCK
                // marker; keep that rejection distinguishable from everything
                // else the database can throw at us.
                let message = db.message().to_lowercase();
                if message.contains("insufficient stock") || message.contains("insufficient_stock")
                {
                    return StoreError::InsufficientStock {
                        detail: db.message().to_string(),
                    };
                }
                StoreError::QueryFailed(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::ConnectionFailed(err.to_string())
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
