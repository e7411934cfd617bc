//! # Stock Cache & Change Feed
//!
//! The read-through cache between the storefront and the stock table.
//!
//! ## Refresh Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stock Cache Lifecycle                              │
//! │                                                                         │
//! │  startup ──► refresh() ──► initial snapshot (or empty on failure)      │
//! │                                                                         │
//! │  store row changes ──► NOTIFY stock_changed ──► feed task              │
//! │                                                    │                    │
//! │                              refetch FULL snapshot ◄┘                   │
//! │                              (no delta merging: whole-table             │
//! │                               consistency over bandwidth)               │
//! │                                    │                                    │
//! │                 watch channel ◄────┘                                    │
//! │                 │         │                                             │
//! │        subscriber A   subscriber B   (drop a receiver = unsubscribe,   │
//! │                                       no callbacks after teardown)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! Fetch and channel errors are logged and swallowed. A failed refresh keeps
//! the previous snapshot; a failed initial fetch leaves the cache empty,
//! which readers treat as "unknown, nothing confirmed in stock". The cache
//! is a hint for the browsing experience, never a gate: the authoritative
//! stock check is the place_order transaction.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use cruffs_core::{Sku, StockAdjustment, StockSnapshot};

use crate::stock::StockLedger;

/// NOTIFY channel the managed store fires on any stock row change.
/// The payload carries no guarantees; consumers refetch the full table.
pub const STOCK_CHANNEL: &str = "stock_changed";

/// Delay before re-establishing a dropped LISTEN connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

// =============================================================================
// Cache
// =============================================================================

/// Shared, process-wide stock snapshot with push-based refresh.
///
/// Injectable (constructed with any [`StockLedger`]) and explicitly
/// subscribable, so it can be faked in tests and torn down cleanly.
#[derive(Debug, Clone)]
pub struct StockCache {
    tx: Arc<watch::Sender<StockSnapshot>>,
}

/// A live subscription to snapshot updates. Dropping it unsubscribes;
/// no further updates are observable after teardown.
#[derive(Debug)]
pub struct StockSubscription {
    rx: watch::Receiver<StockSnapshot>,
}

impl StockSubscription {
    /// Waits for the next snapshot update and returns it.
    ///
    /// Returns `None` once the cache itself has been dropped.
    pub async fn updated(&mut self) -> Option<StockSnapshot> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// The most recently delivered snapshot without waiting.
    pub fn current(&self) -> StockSnapshot {
        self.rx.borrow().clone()
    }
}

impl StockCache {
    /// Creates a cache holding an empty ("unknown") snapshot.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StockSnapshot::empty());
        StockCache { tx: Arc::new(tx) }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> StockSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> StockSubscription {
        StockSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions (for teardown diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Applies an optimistic admin adjustment to the published snapshot and
    /// returns the in-flight command.
    ///
    /// Subscribers see the predicted level immediately, before the store
    /// answers. The caller settles the command with the outcome: `confirm`
    /// on success (the change feed refetch converges the level anyway), or
    /// [`StockCache::rollback_prediction`] on failure.
    pub fn apply_prediction(&self, sku: Sku, delta: i64) -> StockAdjustment {
        let mut snapshot = self.tx.borrow().clone();
        let command = StockAdjustment::apply(&mut snapshot, sku, delta);
        self.tx.send_replace(snapshot);
        command
    }

    /// Undoes a predicted adjustment the store rejected, restoring the
    /// pre-command level in the published snapshot.
    pub fn rollback_prediction(&self, command: &mut StockAdjustment) {
        let mut snapshot = self.tx.borrow().clone();
        command.rollback(&mut snapshot);
        self.tx.send_replace(snapshot);
    }

    /// Refetches the full snapshot from the ledger.
    ///
    /// Fails soft: on any retrieval error the previous snapshot is kept and
    /// the error is logged. Returns whether the refresh succeeded.
    pub async fn refresh(&self, ledger: &dyn StockLedger) -> bool {
        match ledger.fetch_snapshot().await {
            Ok(snapshot) => {
                debug!(rows = snapshot.len(), "Stock snapshot refreshed");
                // send_replace delivers to current subscribers; a send error
                // is impossible because we hold the sender.
                self.tx.send_replace(snapshot);
                true
            }
            Err(err) => {
                warn!(error = %err, "Stock snapshot fetch failed, keeping previous");
                false
            }
        }
    }
}

impl Default for StockCache {
    fn default() -> Self {
        StockCache::new()
    }
}

// =============================================================================
// Change Feed Task
// =============================================================================

/// Drives the cache from the store's push channel until `shutdown` resolves.
///
/// One LISTEN connection per process. Any notification on [`STOCK_CHANNEL`]
/// triggers a full refetch; connection drops are logged and retried after a
/// short delay. The browsing experience must degrade, never crash, so every
/// error path here swallows after logging.
pub async fn run_stock_feed(
    cache: StockCache,
    ledger: Arc<dyn StockLedger>,
    pool: PgPool,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(channel = STOCK_CHANNEL, "Stock feed starting");

    // Initial fill before any notification arrives.
    cache.refresh(ledger.as_ref()).await;

    loop {
        let mut listener = match PgListener::connect_with(&pool).await {
            Ok(l) => l,
            Err(err) => {
                warn!(error = %err, "Stock feed connect failed, retrying");
                if wait_or_shutdown(&mut shutdown, RECONNECT_DELAY).await {
                    return;
                }
                continue;
            }
        };
        if let Err(err) = listener.listen(STOCK_CHANNEL).await {
            warn!(error = %err, "LISTEN failed, retrying");
            if wait_or_shutdown(&mut shutdown, RECONNECT_DELAY).await {
                return;
            }
            continue;
        }

        // A refresh after (re)subscribing closes the gap where a change
        // fired between the initial fill and the LISTEN taking effect.
        cache.refresh(ledger.as_ref()).await;

        loop {
            tokio::select! {
                notification = listener.recv() => match notification {
                    Ok(_) => {
                        // Payload carries no guarantees; refetch everything.
                        cache.refresh(ledger.as_ref()).await;
                    }
                    Err(err) => {
                        warn!(error = %err, "Stock feed dropped, reconnecting");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!("Stock feed shutting down");
                    return;
                }
            }
        }

        if wait_or_shutdown(&mut shutdown, RECONNECT_DELAY).await {
            return;
        }
    }
}

/// Sleeps for `delay`, returning true if shutdown fired first.
async fn wait_or_shutdown(shutdown: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = shutdown.changed() => true,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cruffs_core::AdjustmentState;
    use std::sync::Mutex;

    use crate::error::{StoreError, StoreResult};

    /// In-memory ledger: a queue of canned fetch results.
    struct FakeLedger {
        results: Mutex<Vec<StoreResult<StockSnapshot>>>,
    }

    impl FakeLedger {
        fn with(results: Vec<StoreResult<StockSnapshot>>) -> Self {
            FakeLedger {
                results: Mutex::new(results),
            }
        }
    }

    #[async_trait]
    impl StockLedger for FakeLedger {
        async fn fetch_snapshot(&self) -> StoreResult<StockSnapshot> {
            self.results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(StockSnapshot::empty()))
        }
    }

    fn snapshot(qty: i64) -> StockSnapshot {
        StockSnapshot::from_pairs([(Sku::from("PRISM-POPS"), qty)])
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let cache = StockCache::new();
        let ledger = FakeLedger::with(vec![Ok(snapshot(7))]);

        assert!(cache.snapshot().is_empty());
        assert!(cache.refresh(&ledger).await);
        assert_eq!(cache.snapshot().level(&Sku::from("PRISM-POPS")), 7);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous() {
        let cache = StockCache::new();
        let ledger = FakeLedger::with(vec![
            Err(StoreError::ConnectionFailed("down".to_string())),
            Ok(snapshot(7)),
        ]);

        assert!(cache.refresh(&ledger).await);
        assert!(!cache.refresh(&ledger).await);
        // Failure degraded to "keep what we had", not "all sold out".
        assert_eq!(cache.snapshot().level(&Sku::from("PRISM-POPS")), 7);
    }

    #[tokio::test]
    async fn test_subscriber_sees_update() {
        let cache = StockCache::new();
        let ledger = FakeLedger::with(vec![Ok(snapshot(3))]);

        let mut sub = cache.subscribe();
        cache.refresh(&ledger).await;

        let delivered = sub.updated().await.expect("cache alive");
        assert_eq!(delivered.level(&Sku::from("PRISM-POPS")), 3);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let cache = StockCache::new();
        let sub = cache.subscribe();
        assert_eq!(cache.subscriber_count(), 1);
        drop(sub);
        assert_eq!(cache.subscriber_count(), 0);
    }

    /// A predicted adjustment is visible to every snapshot reader while the
    /// write is in flight, and rolling it back restores the prior level.
    #[tokio::test]
    async fn test_prediction_publishes_and_rolls_back() {
        let cache = StockCache::new();
        let ledger = FakeLedger::with(vec![Ok(snapshot(7))]);
        cache.refresh(&ledger).await;

        let mut cmd = cache.apply_prediction(Sku::from("PRISM-POPS"), -2);
        assert_eq!(cache.snapshot().level(&Sku::from("PRISM-POPS")), 5);

        cache.rollback_prediction(&mut cmd);
        assert_eq!(cmd.state(), AdjustmentState::RolledBack);
        assert_eq!(cache.snapshot().level(&Sku::from("PRISM-POPS")), 7);
    }

    #[tokio::test]
    async fn test_prediction_reaches_subscribers() {
        let cache = StockCache::new();
        let mut sub = cache.subscribe();

        cache.apply_prediction(Sku::from("PRISM-POPS"), 3);

        let delivered = sub.updated().await.expect("cache alive");
        assert_eq!(delivered.level(&Sku::from("PRISM-POPS")), 3);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_cache_dropped() {
        let cache = StockCache::new();
        let mut sub = cache.subscribe();
        drop(cache);
        assert!(sub.updated().await.is_none());
    }
}
