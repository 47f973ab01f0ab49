//! Charge endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use common::{TRACEPARENT_HEADER, TraceContext};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, clamp_rate};
use crate::error::PaymentError;

/// Shared payment state.
#[derive(Debug, Clone)]
pub struct PaymentState {
    failure_rate: f64,
}

impl PaymentState {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate: clamp_rate(failure_rate),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.failure_rate)
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

#[derive(Debug, Serialize)]
pub struct PaidResponse {
    pub paid: bool,
    pub id: String,
}

/// POST /api/pay — approve the charge, or fail it with the configured
/// probability.
#[tracing::instrument(skip_all, fields(trace_id = tracing::field::Empty))]
pub async fn pay(
    State(state): State<Arc<PaymentState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PaidResponse>, PaymentError> {
    let trace = TraceContext::from_header(
        headers
            .get(TRACEPARENT_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    tracing::Span::current().record("trace_id", trace.trace_id.as_str());

    let request: Value = serde_json::from_slice(&body)?;
    let id = match request.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };
    let amount = request.get("amount").cloned().unwrap_or(Value::Null);

    if rand::thread_rng().gen_bool(state.failure_rate) {
        metrics::counter!("payments_total", "result" => "failed").increment(1);
        tracing::warn!(order_id = %id, %amount, "payment failed");
        return Err(PaymentError::GatewayFailure);
    }

    metrics::counter!("payments_total", "result" => "paid").increment(1);
    tracing::info!(order_id = %id, %amount, "payment approved");
    Ok(Json(PaidResponse { paid: true, id }))
}
