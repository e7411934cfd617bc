//! # Relay Events
//!
//! Typed payloads for the email relay's endpoints. Field names are camelCase
//! on the wire because that is what the relay templates read.

use serde::Serialize;

use cruffs_core::ComposedOrder;

/// One line of the placed-order summary email.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub name: String,
    pub quantity: i64,
}

/// A notification to relay. One variant per relay endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum NotifyEvent {
    /// Payment-instruction email after a successful place_order.
    OrderPlaced {
        email: String,
        name: String,
        order_code: String,
        total_cents: i64,
        items: Vec<ItemSummary>,
    },

    /// Payment-received confirmation.
    OrderPaid {
        email: String,
        name: String,
        order_code: String,
    },

    /// Cancellation/expiry notice.
    OrderCancelled {
        email: String,
        name: String,
        order_code: String,
        reason: String,
    },

    /// On-the-way / ready-for-pickup notice.
    OrderFulfilled {
        email: String,
        name: String,
        order_code: String,
    },

    /// Contact-form message forwarded to the shop inbox.
    ContactMessage {
        email: String,
        name: String,
        message: String,
    },
}

impl NotifyEvent {
    /// Relay endpoint path for this event.
    pub fn endpoint(&self) -> &'static str {
        match self {
            NotifyEvent::OrderPlaced { .. } => "/api/emails/placed",
            NotifyEvent::OrderPaid { .. } => "/api/emails/paid",
            NotifyEvent::OrderCancelled { .. } => "/api/emails/cancelled",
            NotifyEvent::OrderFulfilled { .. } => "/api/emails/fulfilled",
            NotifyEvent::ContactMessage { .. } => "/api/emails/contact",
        }
    }

    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyEvent::OrderPlaced { .. } => "order_placed",
            NotifyEvent::OrderPaid { .. } => "order_paid",
            NotifyEvent::OrderCancelled { .. } => "order_cancelled",
            NotifyEvent::OrderFulfilled { .. } => "order_fulfilled",
            NotifyEvent::ContactMessage { .. } => "contact_message",
        }
    }

    /// Builds the placed-order event from a composed order.
    ///
    /// The summary lists what the customer sees: the display-only bundle
    /// aggregate row included, exactly as on the order itself.
    pub fn order_placed(order: &ComposedOrder, email: &str, name: &str) -> Self {
        NotifyEvent::OrderPlaced {
            email: email.to_string(),
            name: name.to_string(),
            order_code: order.order_code.clone(),
            total_cents: order.total.cents(),
            items: order
                .items
                .iter()
                .map(|i| ItemSummary {
                    name: i.name.clone(),
                    quantity: i.quantity,
                })
                .collect(),
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
    fn test_endpoint_mapping() {
        let paid = NotifyEvent::OrderPaid {
            email: "a@b.ca".to_string(),
            name: "A".to_string(),
            order_code: "ABC-123".to_string(),
        };
        assert_eq!(paid.endpoint(), "/api/emails/paid");
        assert_eq!(paid.kind(), "order_paid");
    }

    #[test]
    fn test_payload_is_camel_case() {
        let event = NotifyEvent::OrderCancelled {
            email: "a@b.ca".to_string(),
            name: "A".to_string(),
            order_code: "ABC-123".to_string(),
            reason: "Payment not received.".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "email": "a@b.ca",
                "name": "A",
                "orderCode": "ABC-123",
                "reason": "Payment not received.",
            })
        );
    }

    #[test]
    fn test_placed_payload_shape() {
        let event = NotifyEvent::OrderPlaced {
            email: "a@b.ca".to_string(),
            name: "A".to_string(),
            order_code: "ABC-123".to_string(),
            total_cents: 2700,
            items: vec![ItemSummary {
                name: "Caramelts (Large)".to_string(),
                quantity: 3,
            }],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["totalCents"], serde_json::json!(2700));
        assert_eq!(json["items"][0]["quantity"], serde_json::json!(3));
    }
}
