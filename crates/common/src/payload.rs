//! Order payload parsing at the service boundary.

use serde_json::{Map, Value};
use thiserror::Error;

/// Loosely typed order payload: arbitrary client fields keyed by name.
pub type OrderPayload = Map<String, Value>;

/// Rejection reasons for an inbound order body.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("request body must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Parses a request body into an order payload.
///
/// Only JSON objects are accepted; everything else is malformed input.
pub fn parse_payload(body: &[u8]) -> Result<OrderPayload, PayloadError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(PayloadError::NotAnObject(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_objects_with_unknown_fields() {
        let payload = parse_payload(br#"{"amount": 100, "note": "gift", "nested": {"a": 1}}"#).unwrap();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload["note"], "gift");
    }

    #[test]
    fn numbers_keep_their_written_form() {
        let body = br#"{"id":12345678901234567890123,"amount":12.50,"qty":1e3}"#;
        let payload = parse_payload(body).unwrap();
        assert_eq!(payload["id"].to_string(), "12345678901234567890123");
        assert_eq!(serde_json::to_vec(&payload).unwrap(), body.to_vec());
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_payload(b"{not json").unwrap_err();
        assert!(matches!(err, PayloadError::InvalidJson(_)));
    }

    #[test]
    fn rejects_non_object_json() {
        let err = parse_payload(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, PayloadError::NotAnObject("array")));
        assert!(matches!(parse_payload(b"null"), Err(PayloadError::NotAnObject("null"))));
    }

    #[test]
    fn rejects_empty_body() {
        assert!(matches!(parse_payload(b""), Err(PayloadError::InvalidJson(_))));
    }
}
