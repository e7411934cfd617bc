//! HTTP route table.

pub mod admin;
pub mod catalog;
pub mod contact;
pub mod health;
pub mod orders;
pub mod stock;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

/// Builds the full route table. Layers (tracing, CORS) are applied by the
/// caller.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/:id", delete(admin::delete_order))
        .route("/orders/:id/paid", post(admin::mark_paid))
        .route("/orders/:id/fulfilled", post(admin::mark_fulfilled))
        .route("/orders/:id/cancel", post(admin::cancel_order))
        .route("/orders/:id/reopen", post(admin::reopen_order))
        .route("/stock/:sku", post(admin::adjust_stock))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ));

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/stock", get(stock::get_stock))
        .route("/api/orders", post(orders::place_order))
        .route("/api/contact", post(contact::send_message))
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
