//! Current stock snapshot for the storefront.
//!
//! Served straight from the in-process cache; no store round-trip per
//! request. `known = false` means the snapshot is empty because no fetch has
//! succeeded yet, and the storefront should treat every level as unconfirmed
//! rather than sold out.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use cruffs_core::is_bundle_available;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StockResponse {
    /// Whether any snapshot has been retrieved at all.
    pub known: bool,

    /// SKU → confirmed stock level.
    pub levels: HashMap<String, i64>,

    /// Whether the customizable bundle can currently be offered.
    pub bundle_available: bool,
}

pub async fn get_stock(State(state): State<AppState>) -> Json<StockResponse> {
    let snapshot = state.stock.snapshot();
    Json(StockResponse {
        known: !snapshot.is_empty(),
        bundle_available: is_bundle_available(&snapshot, &state.deals.bundle),
        levels: snapshot
            .iter()
            .map(|(sku, qty)| (sku.as_str().to_string(), qty))
            .collect(),
    })
}
