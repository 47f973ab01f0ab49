//! Order pass-through endpoint.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::Response;
use common::{TRACEPARENT_HEADER, TraceContext};
use serde::de::IgnoredAny;

use crate::config::Config;
use crate::error::GatewayError;

/// Shared gateway state: one pooled client and the upstream URL.
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub client: reqwest::Client,
    pub order_service_url: String,
}

impl GatewayState {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            client,
            order_service_url: config.order_service_url.clone(),
        })
    }
}

/// POST /api/order — forward the order to the order service.
///
/// The body must be JSON; anything else is answered here. A valid body is
/// forwarded byte for byte, and the upstream status, content type and body
/// are relayed unchanged.
#[tracing::instrument(skip_all, fields(trace_id = tracing::field::Empty))]
pub async fn forward(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let trace = TraceContext::from_header(
        headers
            .get(TRACEPARENT_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    tracing::Span::current().record("trace_id", trace.trace_id.as_str());

    serde_json::from_slice::<IgnoredAny>(&body)?;

    let result = relay(&state, &trace, body).await;
    let status = match &result {
        Ok(response) => response.status(),
        Err(e) => e.status(),
    };
    metrics::counter!("gateway_forwards_total", "status" => status.as_str().to_owned())
        .increment(1);

    match &result {
        Ok(_) => tracing::info!(status = status.as_u16(), "order forwarded"),
        Err(e) => tracing::warn!(status = status.as_u16(), error = %e, "order forward failed"),
    }
    result
}

async fn relay(
    state: &GatewayState,
    trace: &TraceContext,
    payload: Bytes,
) -> Result<Response, GatewayError> {
    let upstream = state
        .client
        .post(&state.order_service_url)
        .header(TRACEPARENT_HEADER, trace.child().to_traceparent())
        .header(header::CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
        .await?;

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let body = upstream.bytes().await?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}
