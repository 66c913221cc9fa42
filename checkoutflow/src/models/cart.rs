//! Cart snapshot parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fields of a refreshed cart the pipeline cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    /// Cart identifier.
    pub cart_id: Option<String>,
    /// Guest user identifier.
    pub guest_id: Option<String>,
    /// Number of units in the cart.
    pub total_unit_count: Option<u64>,
    /// Formatted total including tax.
    pub total: Option<String>,
    /// Whether the cart carries a shipping address.
    pub has_shipping_address: bool,
}

impl CartSummary {
    /// Reads a cart response body. Missing fields are left empty.
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        Self {
            cart_id: string_at(body, &["cartId"]).or_else(|| string_at(body, &["code"])),
            guest_id: string_at(body, &["user", "id"]),
            total_unit_count: body.get("totalUnitCount").and_then(Value::as_u64),
            total: string_at(body, &["totalPriceWithTax", "formattedValue"]),
            has_shipping_address: ["shippingAddress", "deliveryAddress"]
                .iter()
                .any(|key| body.get(key).and_then(Value::as_object).is_some_and(|o| !o.is_empty())),
        }
    }
}

fn string_at(body: &Value, path: &[&str]) -> Option<String> {
    let value = path.iter().try_fold(body, |node, key| node.get(key))?;
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_cart_fields() {
        let cart = CartSummary::from_body(&json!({
            "cartId": "abc123",
            "user": {"id": "guest-1"},
            "totalUnitCount": 2,
            "totalPriceWithTax": {"formattedValue": "$129.99"},
            "shippingAddress": {"line1": "1 Morris Rd"}
        }));

        assert_eq!(cart.cart_id.as_deref(), Some("abc123"));
        assert_eq!(cart.guest_id.as_deref(), Some("guest-1"));
        assert_eq!(cart.total_unit_count, Some(2));
        assert_eq!(cart.total.as_deref(), Some("$129.99"));
        assert!(cart.has_shipping_address);
    }

    #[test]
    fn test_empty_shipping_object_is_absent() {
        let cart = CartSummary::from_body(&json!({"cartId": "abc", "shippingAddress": {}}));
        assert!(!cart.has_shipping_address);
    }

    #[test]
    fn test_delivery_address_counts_as_shipping() {
        let cart = CartSummary::from_body(&json!({"deliveryAddress": {"town": "South Hill"}}));
        assert!(cart.has_shipping_address);
        assert_eq!(cart.cart_id, None);
    }
}
