//! # Error Types
//!
//! Domain-specific error types for cruffs-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cruffs-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cruffs-store errors (separate crate)                                  │
//! │  └── StoreError       - Datastore / stored-procedure failures          │
//! │                                                                         │
//! │  shop-api errors (in app)                                              │
//! │  └── ApiError         - What the storefront sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ApiError → UI        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, key, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::catalog::{CartKey, Sku};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations detected before any network
/// call. They are caught and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart line no longer resolves against the catalog.
    #[error("Unknown product/size: {0}")]
    UnknownCartKey(CartKey),

    /// A bundle selection references a SKU outside the bundle's eligible set.
    #[error("SKU {0} is not eligible for this bundle")]
    SkuNotInBundle(Sku),

    /// A bundle increment would push the selection past its live stock.
    ///
    /// Advisory only: the selection check uses the local snapshot, and the
    /// external transaction re-checks authoritatively at submission.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    BundleOverStock {
        sku: Sku,
        available: i64,
        requested: i64,
    },

    /// A bundle increment would exceed the bundle's fixed item cap.
    #[error("Bundle is limited to {capacity} items")]
    BundleOverCapacity { capacity: u32 },

    /// A bundle selection that doesn't fill the bundle exactly cannot be
    /// submitted; checkout only opens on a complete pick.
    #[error("Bundle has {selected} of {capacity} items selected")]
    IncompleteBundle { selected: i64, capacity: u32 },

    /// Nothing to submit.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when checkout input doesn't meet requirements. Used for early
/// validation before anything touches the network.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value doesn't look like what it claims to be.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Delivery address is outside the serviced zone.
    #[error("Address is outside our delivery zone")]
    OutsideDeliveryZone,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::BundleOverStock {
            sku: Sku::from("PRISM-POPS"),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for PRISM-POPS: available 2, requested 3"
        );

        let err = CoreError::BundleOverCapacity { capacity: 6 };
        assert_eq!(err.to_string(), "Bundle is limited to 6 items");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required { field: "email" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
