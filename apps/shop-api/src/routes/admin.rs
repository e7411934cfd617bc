//! # Admin Console Routes
//!
//! Order management and stock point-writes, behind a shared bearer token.
//!
//! ## Transitions and Their Side Channels
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  paid       : status only                        + payment email       │
//! │  fulfilled  : status only                        + on-the-way email    │
//! │  cancel     : admin_release_stock transaction    + cancellation email  │
//! │               (restores stock + sets cancelled, atomically)            │
//! │  reopen     : re-decrement + status, one local tx, NO email            │
//! │  delete     : terminal states only, irreversible, NO email            │
//! │  stock +/-  : point-write, change feed refreshes every cache           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use cruffs_core::{OrderStatus, Sku};
use cruffs_notify::NotifyEvent;
use cruffs_store::{OrderGateway, OrderRecord, StoreError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Auth
// =============================================================================

/// Rejects any request whose bearer token does not match the configured
/// admin token. One shared token: the console has exactly one operator.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == state.admin_token.as_str());

    if !authorized {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Wire status name; defaults to the payment queue.
    pub status: Option<String>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<OrderRecord>>> {
    let status = match query.status.as_deref() {
        None => OrderStatus::PendingPayment,
        Some(s) => OrderStatus::parse(s)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown order status '{s}'")))?,
    };
    Ok(Json(state.orders.list_by_status(status).await?))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderRecord>> {
    let order = state.orders.mark_paid(id).await?;
    state.notifier.enqueue(NotifyEvent::OrderPaid {
        email: order.customer_email.clone(),
        name: order.customer_name.clone(),
        order_code: order.order_code.clone(),
    });
    Ok(Json(order))
}

pub async fn mark_fulfilled(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderRecord>> {
    let order = state.orders.mark_fulfilled(id).await?;
    state.notifier.enqueue(NotifyEvent::OrderFulfilled {
        email: order.customer_email.clone(),
        name: order.customer_name.clone(),
        order_code: order.order_code.clone(),
    });
    Ok(Json(order))
}

/// Cancels a pending order through the atomic release transaction: stock
/// restored and status set in one step on the store side.
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderRecord>> {
    let order = state.orders.get(id).await?;
    if !order.status.can_transition_to(OrderStatus::Cancelled) {
        return Err(StoreError::InvalidTransition {
            order_id: id.to_string(),
            from: order.status,
            to: OrderStatus::Cancelled,
        }
        .into());
    }

    state.gateway.release_stock(id).await?;

    state.notifier.enqueue(NotifyEvent::OrderCancelled {
        email: order.customer_email.clone(),
        name: order.customer_name.clone(),
        order_code: order.order_code.clone(),
        reason: "Payment was not received in time.".to_string(),
    });

    Ok(Json(OrderRecord {
        status: OrderStatus::Cancelled,
        ..order
    }))
}

/// Reopens a cancelled/expired order back to paid. The customer already
/// paid; no email goes out.
pub async fn reopen_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderRecord>> {
    Ok(Json(state.orders.reopen(id).await?))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state.orders.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// =============================================================================
// Stock
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub delta: i64,
}

#[derive(Debug, Serialize)]
pub struct AdjustResponse {
    pub sku: Sku,
    pub stock_qty: i64,
}

/// Applies a stock delta as an optimistic command: the predicted level is
/// published to the shared cache immediately, so stock readers see it while
/// the point-write is in flight, then the command is settled with the
/// store's answer. On success the change feed refetch converges the level;
/// on failure the prediction is rolled back in place.
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Json(req): Json<AdjustRequest>,
) -> ApiResult<Json<AdjustResponse>> {
    let sku = Sku::new(sku);
    let mut command = state.stock.apply_prediction(sku.clone(), req.delta);

    match state.ledger.adjust(&sku, req.delta).await {
        Ok(stock_qty) => {
            command.confirm();
            info!(sku = %sku, delta = req.delta, stock_qty, "Stock adjusted");
            Ok(Json(AdjustResponse { sku, stock_qty }))
        }
        Err(err) => {
            state.stock.rollback_prediction(&mut command);
            Err(err.into())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_list_status_is_payment_queue() {
        // Mirrors the handler's defaulting rule.
        let q = ListQuery { status: None };
        let status = q
            .status
            .as_deref()
            .map_or(Some(OrderStatus::PendingPayment), OrderStatus::parse);
        assert_eq!(status, Some(OrderStatus::PendingPayment));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(OrderStatus::parse("shipped").is_none());
    }
}
