//! Gateway error types with HTTP response mapping.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors the gateway answers itself instead of relaying upstream.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request body is not JSON; nothing was forwarded.
    #[error("malformed order payload: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The order service could not be reached or dropped the connection.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The order service did not answer in time.
    #[error("upstream timeout")]
    UpstreamTimeout,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::UpstreamTimeout
        } else {
            GatewayError::UpstreamUnavailable(err.to_string())
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            GatewayError::MalformedJson(err) => json!({
                "title": "malformed order payload",
                "status": status.as_u16(),
                "detail": err.to_string(),
            }),
            GatewayError::UpstreamUnavailable(_) => json!({
                "title": "upstream unavailable",
                "status": status.as_u16(),
            }),
            GatewayError::UpstreamTimeout => json!({
                "title": "upstream timeout",
                "status": status.as_u16(),
            }),
        };

        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            body.to_string(),
        )
            .into_response()
    }
}
