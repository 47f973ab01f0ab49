//! Typed view over the loosely typed order payload.
//!
//! This is the only place the saga reads untyped fields. Everything past
//! [`Order::from_payload`] works with [`OrderId`] and [`Amount`].

use common::{OrderId, OrderPayload};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Payload field holding the order's primary key.
pub const ID_FIELD: &str = "id";

/// Payload field holding the amount to charge.
pub const AMOUNT_FIELD: &str = "amount";

/// Amount to charge, kept as the client sent it (integer or decimal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Number);

impl Amount {
    pub fn zero() -> Self {
        Self(Number::from(0))
    }

    /// Reads an amount, defaulting to zero when absent or non-numeric.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => Self(n.clone()),
            _ => Self::zero(),
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(0.0)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Number::from(value))
    }
}

/// An order accepted for processing.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    id_generated: bool,
    amount: Amount,
    payload: OrderPayload,
}

impl Order {
    /// Resolves the authoritative id and amount from a raw payload.
    ///
    /// A non-empty string `id` is used verbatim and a numeric `id` in the exact
    /// text the client wrote; any other shape (missing, null, empty, bool,
    /// array, object) gets a freshly generated id. The payload itself is
    /// kept exactly as received.
    pub fn from_payload(payload: OrderPayload) -> Self {
        let (id, id_generated) = match extract_id(&payload) {
            Some(id) => (id, false),
            None => (OrderId::generate(), true),
        };
        let amount = Amount::from_value(payload.get(AMOUNT_FIELD));

        Self {
            id,
            id_generated,
            amount,
            payload,
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// True if the id was generated rather than supplied by the client.
    pub fn id_generated(&self) -> bool {
        self.id_generated
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn payload(&self) -> &OrderPayload {
        &self.payload
    }
}

fn extract_id(payload: &OrderPayload) -> Option<OrderId> {
    match payload.get(ID_FIELD)? {
        Value::String(s) if !s.is_empty() => Some(OrderId::new(s.as_str())),
        Value::Number(n) => Some(OrderId::new(n.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> OrderPayload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_supplied_string_id_is_authoritative() {
        let order = Order::from_payload(payload(json!({"id": "abc", "amount": 50})));
        assert_eq!(order.id().as_str(), "abc");
        assert!(!order.id_generated());
        assert_eq!(order.amount(), &Amount::from(50));
    }

    #[test]
    fn test_numeric_id_uses_its_text_form() {
        let order = Order::from_payload(payload(json!({"id": 42})));
        assert_eq!(order.id().as_str(), "42");
        assert!(!order.id_generated());
    }

    #[test]
    fn test_numeric_id_beyond_u64_keeps_every_digit() {
        let raw = common::parse_payload(br#"{"id": 12345678901234567890123, "amount": 12.50}"#)
            .unwrap();
        let order = Order::from_payload(raw);
        assert_eq!(order.id().as_str(), "12345678901234567890123");
        assert_eq!(order.amount().to_string(), "12.50");
    }

    #[test]
    fn test_missing_id_is_generated() {
        let order = Order::from_payload(payload(json!({"amount": 100})));
        assert!(order.id_generated());
        assert!(!order.id().as_str().is_empty());
    }

    #[test]
    fn test_unusable_ids_are_replaced() {
        for id in [json!(null), json!(""), json!(true), json!([1]), json!({"x": 1})] {
            let order = Order::from_payload(payload(json!({ "id": id.clone() })));
            assert!(order.id_generated(), "id {id} should be replaced");
        }
    }

    #[test]
    fn test_amount_defaults_to_zero() {
        let missing = Order::from_payload(payload(json!({})));
        assert_eq!(missing.amount(), &Amount::zero());

        let text = Order::from_payload(payload(json!({"amount": "100"})));
        assert_eq!(text.amount(), &Amount::zero());
    }

    #[test]
    fn test_decimal_amount_is_preserved() {
        let order = Order::from_payload(payload(json!({"amount": 19.99})));
        assert_eq!(order.amount().as_f64(), 19.99);
        assert_eq!(serde_json::to_value(order.amount()).unwrap(), json!(19.99));
    }

    #[test]
    fn test_payload_passes_through_untouched() {
        let raw = payload(json!({"amount": 1, "note": "gift", "lines": [{"sku": "A"}]}));
        let order = Order::from_payload(raw.clone());
        assert_eq!(order.payload(), &raw);
    }
}
