//! # API Error Mapping
//!
//! The last translation step before the storefront sees an error.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bad input (validation, malformed)            ──► 400 + field detail   │
//! │  missing/bad admin token                      ──► 401                  │
//! │  entity not found                             ──► 404                  │
//! │  stock conflict at place_order                ──► 409 out_of_stock     │
//! │  illegal status change / delete               ──► 409 invalid_state    │
//! │  store unreachable / query failed             ──► 502 store_error      │
//! │                                                                         │
//! │  out_of_stock tells the customer "refresh and re-pick"; store_error    │
//! │  tells them "try again shortly". The two MUST NOT be conflated.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use cruffs_core::{CoreError, ValidationError};
use cruffs_store::StoreError;

/// Errors a handler can surface to the storefront.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            // Core validation errors keep their 400 shape.
            CoreError::Validation(v) => ApiError::Validation(v),
            other => ApiError::Core(other),
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ApiError::Core(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Store(err) => match err {
                StoreError::InsufficientStock { .. } => (StatusCode::CONFLICT, "out_of_stock"),
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                StoreError::InvalidTransition { .. } | StoreError::NotDeletable { .. } => {
                    (StatusCode::CONFLICT, "invalid_state")
                }
                StoreError::ConnectionFailed(_) | StoreError::QueryFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "store_error")
                }
            },
        }
    }

    fn message(&self) -> String {
        match self {
            // The customer-facing stock conflict never leaks procedure
            // internals; the detail goes to the log instead.
            ApiError::Store(StoreError::InsufficientStock { .. }) => {
                "Some items are no longer available. Please refresh and try again.".to_string()
            }
            ApiError::Store(StoreError::ConnectionFailed(_) | StoreError::QueryFailed(_)) => {
                "The shop is having trouble right now. Please try again shortly.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!(code, detail = %self, "Request failed");
        } else {
            warn!(code, detail = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message: self.message(),
            },
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// The stock conflict stays distinguishable from a generic store outage:
    /// 409/out_of_stock means "refresh and re-pick", 502 means "retry".
    #[test]
    fn test_stock_conflict_is_409_not_502() {
        let conflict = ApiError::Store(StoreError::InsufficientStock {
            detail: "INSUFFICIENT_STOCK: CARAMELTS-LRG".to_string(),
        });
        assert_eq!(
            conflict.status_and_code(),
            (StatusCode::CONFLICT, "out_of_stock")
        );

        let outage = ApiError::Store(StoreError::ConnectionFailed("pool timeout".to_string()));
        assert_eq!(
            outage.status_and_code(),
            (StatusCode::BAD_GATEWAY, "store_error")
        );
    }

    #[test]
    fn test_stock_conflict_message_hides_internals() {
        let conflict = ApiError::Store(StoreError::InsufficientStock {
            detail: "INSUFFICIENT_STOCK: CARAMELTS-LRG".to_string(),
        });
        assert!(!conflict.message().contains("CARAMELTS"));
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "email",
        }));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "invalid_input")
        );
    }

    #[test]
    fn test_illegal_transition_maps_to_conflict() {
        let err = ApiError::Store(StoreError::NotDeletable {
            order_id: "7e6d".to_string(),
            status: cruffs_core::OrderStatus::Paid,
        });
        assert_eq!(
            err.status_and_code(),
            (StatusCode::CONFLICT, "invalid_state")
        );
    }
}
