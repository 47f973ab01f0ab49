//! Order creation endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use common::{TRACEPARENT_HEADER, TraceContext, parse_payload};
use saga::{EventPublisher, OrderOrchestrator, OrderOutcome, PaymentGateway, StateStore};
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, P, E>
where
    S: StateStore,
    P: PaymentGateway,
    E: EventPublisher,
{
    pub orchestrator: OrderOrchestrator<S, P, E>,
}

#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    pub id: String,
    pub ok: bool,
}

/// POST /api/order — run the order saga for an arbitrary JSON object.
///
/// The body is read raw so a malformed payload is answered with our own
/// problem document before any collaborator is contacted.
#[tracing::instrument(skip_all)]
pub async fn create<S, P, E>(
    State(state): State<Arc<AppState<S, P, E>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<OrderCreatedResponse>, ApiError>
where
    S: StateStore + 'static,
    P: PaymentGateway + 'static,
    E: EventPublisher + 'static,
{
    let trace = TraceContext::from_header(
        headers
            .get(TRACEPARENT_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    let payload = parse_payload(&body)
        .inspect_err(|_| metrics::counter!("orders_rejected_total").increment(1))?;

    match state.orchestrator.create_order(payload, &trace).await {
        OrderOutcome::Created { id, .. } => Ok(Json(OrderCreatedResponse {
            id: id.to_string(),
            ok: true,
        })),
        OrderOutcome::Failed { id, reason, .. } => Err(ApiError::Saga {
            id,
            reason,
            trace_id: trace.trace_id,
        }),
    }
}
