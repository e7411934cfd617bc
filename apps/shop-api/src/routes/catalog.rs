//! Catalog and deal configuration for the storefront.
//!
//! Everything here is static per deployed binary; the storefront fetches it
//! once at load and renders product cards, deal banners and the bundle
//! picker from it.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use cruffs_core::{BundleConfig, Product, TierDeal};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub products: Vec<Product>,
    pub tier_deals: Vec<TierDeal>,
    pub bundle: BundleConfig,
}

pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        products: state.catalog.products().to_vec(),
        tier_deals: state.deals.tier_deals.clone(),
        bundle: state.deals.bundle.clone(),
    })
}
