//! API error types with HTTP response mapping.
//!
//! Every error leaves the service as an RFC 7807 problem document.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::{OrderId, PayloadError};
use saga::FailureReason;
use serde_json::{Value, json};
use thiserror::Error;

/// Content type of every error body.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is not a JSON object. Nothing downstream was called.
    #[error("malformed order payload: {0}")]
    MalformedInput(#[from] PayloadError),

    /// The saga ran and ended in a failure the caller must see.
    #[error("order {id} failed: {reason}")]
    Saga {
        id: OrderId,
        reason: FailureReason,
        trace_id: String,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MalformedInput(err) => {
                tracing::debug!(error = %err, "rejecting malformed order payload");
                problem(
                    StatusCode::BAD_REQUEST,
                    json!({
                        "title": "malformed order payload",
                        "status": 400,
                        "detail": err.to_string(),
                    }),
                )
            }
            ApiError::Saga {
                id,
                reason,
                trace_id,
            } => {
                let status = StatusCode::from_u16(reason.status_hint())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                problem(
                    status,
                    json!({
                        "title": reason.title(),
                        "status": status.as_u16(),
                        "order_id": id,
                        "trace_id": trace_id,
                    }),
                )
            }
        }
    }
}

/// Builds a problem-detail response with the given status.
pub fn problem(status: StatusCode, body: Value) -> Response {
    (status, [(header::CONTENT_TYPE, PROBLEM_JSON)], body.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_payment_failure_is_bad_gateway_problem() {
        let response = ApiError::Saga {
            id: OrderId::new("abc"),
            reason: FailureReason::PaymentFailed,
            trace_id: "4bf92f3577b34da6a3ce929d0e0e4736".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_JSON);
        let body = body_of(response).await;
        assert_eq!(body["title"], "payment failed");
        assert_eq!(body["status"], 502);
        assert_eq!(body["order_id"], "abc");
        assert_eq!(body["trace_id"], "4bf92f3577b34da6a3ce929d0e0e4736");
    }

    #[tokio::test]
    async fn test_persistence_failure_is_service_unavailable() {
        let response = ApiError::Saga {
            id: OrderId::new("abc"),
            reason: FailureReason::PersistenceFailed,
            trace_id: String::new(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_malformed_input_is_bad_request() {
        let err = common::parse_payload(b"{not json").unwrap_err();
        let response = ApiError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["title"], "malformed order payload");
        assert!(body["detail"].as_str().is_some());
    }
}
