//! Payment service error types with HTTP response mapping.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Request body is not JSON.
    #[error("malformed payment request: {0}")]
    MalformedRequest(#[from] serde_json::Error),

    /// The simulated payment provider rejected the charge.
    #[error("payment gateway error")]
    GatewayFailure,
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            PaymentError::MalformedRequest(err) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "title": "malformed payment request",
                    "status": 400,
                    "detail": err.to_string(),
                }),
            ),
            PaymentError::GatewayFailure => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "title": "payment gateway error", "status": 500 }),
            ),
        };

        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            body.to_string(),
        )
            .into_response()
    }
}
