//! # Checkout Validation
//!
//! Business rule validation for order submission. Everything here rejects
//! bad input BEFORE any network call; a request that passes validation may
//! still fail at the external transaction (stock race), which is a different
//! error class entirely.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Pickup,
    Delivery,
}

/// Customer contact plus delivery details, as entered in the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub delivery: DeliveryType,
    /// Required for delivery orders, ignored for pickup.
    pub address: Option<String>,
}

impl CustomerInfo {
    pub fn is_pickup(&self) -> bool {
        self.delivery == DeliveryType::Pickup
    }
}

/// The zone the shop delivers to. Delivery addresses must name one of the
/// serviced areas; the storefront's address-autocomplete keeps honest users
/// inside the zone, this is the backstop.
#[derive(Debug, Clone)]
pub struct DeliveryZone {
    areas: Vec<String>,
}

impl DeliveryZone {
    pub fn new(areas: impl IntoIterator<Item = impl Into<String>>) -> Self {
        DeliveryZone {
            areas: areas.into_iter().map(|a| a.into().to_lowercase()).collect(),
        }
    }

    /// Case-insensitive containment check against the serviced areas.
    pub fn contains(&self, address: &str) -> bool {
        let address = address.to_lowercase();
        self.areas.iter().any(|area| address.contains(area))
    }
}

/// Validates customer contact details.
///
/// Format checks are deliberately shallow (a `@` with text around it, at
/// least 7 digits in the phone): the point is catching blank and obviously
/// mangled fields inline, not RFC 5321 compliance.
pub fn validate_customer(customer: &CustomerInfo) -> Result<(), ValidationError> {
    if customer.name.trim().is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }

    let email = customer.email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required { field: "email" });
    }
    let looks_like_email = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !looks_like_email {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "expected something like name@example.com",
        });
    }

    let digits = customer.phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return Err(ValidationError::Required { field: "phone" });
    }
    if digits < 7 {
        return Err(ValidationError::InvalidFormat {
            field: "phone",
            reason: "too few digits",
        });
    }

    Ok(())
}

/// Validates the delivery leg: delivery orders need an in-zone address,
/// pickup orders need nothing.
pub fn validate_delivery(customer: &CustomerInfo, zone: &DeliveryZone) -> Result<(), ValidationError> {
    if customer.is_pickup() {
        return Ok(());
    }
    let address = customer
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or(ValidationError::Required { field: "address" })?;
    if !zone.contains(address) {
        return Err(ValidationError::OutsideDeliveryZone);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Harper Lee".to_string(),
            email: "harper@example.com".to_string(),
            phone: "613-555-0142".to_string(),
            delivery: DeliveryType::Delivery,
            address: Some("12 Bank St, Ottawa, ON".to_string()),
        }
    }

    fn zone() -> DeliveryZone {
        DeliveryZone::new(["Ottawa", "Kanata", "Nepean", "Gatineau"])
    }

    #[test]
    fn test_valid_customer_passes() {
        assert!(validate_customer(&customer()).is_ok());
        assert!(validate_delivery(&customer(), &zone()).is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut c = customer();
        c.name = "   ".to_string();
        assert!(matches!(
            validate_customer(&c),
            Err(ValidationError::Required { field: "name" })
        ));

        let mut c = customer();
        c.email = String::new();
        assert!(matches!(
            validate_customer(&c),
            Err(ValidationError::Required { field: "email" })
        ));
    }

    #[test]
    fn test_mangled_email_rejected() {
        for bad in ["harper", "@example.com", "harper@", "harper@localhost"] {
            let mut c = customer();
            c.email = bad.to_string();
            assert!(
                matches!(
                    validate_customer(&c),
                    Err(ValidationError::InvalidFormat { field: "email", .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut c = customer();
        c.phone = "42".to_string();
        assert!(matches!(
            validate_customer(&c),
            Err(ValidationError::InvalidFormat { field: "phone", .. })
        ));
    }

    #[test]
    fn test_pickup_skips_address_checks() {
        let mut c = customer();
        c.delivery = DeliveryType::Pickup;
        c.address = None;
        assert!(validate_delivery(&c, &zone()).is_ok());
    }

    #[test]
    fn test_delivery_requires_address() {
        let mut c = customer();
        c.address = None;
        assert!(matches!(
            validate_delivery(&c, &zone()),
            Err(ValidationError::Required { field: "address" })
        ));
    }

    #[test]
    fn test_out_of_zone_address_rejected() {
        let mut c = customer();
        c.address = Some("99 Queen St W, Toronto, ON".to_string());
        assert!(matches!(
            validate_delivery(&c, &zone()),
            Err(ValidationError::OutsideDeliveryZone)
        ));
    }

    #[test]
    fn test_zone_check_is_case_insensitive() {
        let mut c = customer();
        c.address = Some("12 bank st, OTTAWA".to_string());
        assert!(validate_delivery(&c, &zone()).is_ok());
    }
}
