//! Order service: exposes the order saga over HTTP.
//!
//! `POST /api/order` runs persist → pay → publish through the
//! [`OrderOrchestrator`](saga::OrderOrchestrator), with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use common::http::observability_routes;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    EventPublisher, HttpEventPublisher, HttpPaymentGateway, HttpStateStore, InMemoryEventPublisher,
    InMemoryPaymentGateway, InMemoryStateStore, OrderOrchestrator, PaymentGateway, SagaConfig,
    SagaError, StateStore,
};
use tower_http::trace::TraceLayer;

use config::Config;
pub use routes::order::AppState;

/// State wired to the sidecar-backed HTTP collaborators.
pub type HttpAppState = AppState<HttpStateStore, HttpPaymentGateway, HttpEventPublisher>;

/// State wired to in-memory collaborators.
pub type InMemoryAppState =
    AppState<InMemoryStateStore, InMemoryPaymentGateway, InMemoryEventPublisher>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, P, E>(state: Arc<AppState<S, P, E>>, metrics_handle: PrometheusHandle) -> Router
where
    S: StateStore + 'static,
    P: PaymentGateway + 'static,
    E: EventPublisher + 'static,
{
    Router::new()
        .route("/api/order", post(routes::order::create::<S, P, E>))
        .with_state(state)
        .merge(observability_routes("ordersvc", metrics_handle))
        .layer(TraceLayer::new_for_http())
}

/// Builds the production state: every collaborator reached over HTTP.
pub fn create_http_state(config: &Config) -> Result<Arc<HttpAppState>, SagaError> {
    let orchestrator = OrderOrchestrator::new(
        HttpStateStore::new(&config.state_store)?,
        HttpPaymentGateway::new(&config.payment)?,
        HttpEventPublisher::new(&config.publisher)?,
        config.saga,
    );
    Ok(Arc::new(AppState { orchestrator }))
}

/// Builds state over in-memory collaborators and hands back their handles
/// for inspection.
pub fn create_default_state(
    saga: SagaConfig,
) -> (
    Arc<InMemoryAppState>,
    InMemoryStateStore,
    InMemoryPaymentGateway,
    InMemoryEventPublisher,
) {
    let store = InMemoryStateStore::new();
    let payment = InMemoryPaymentGateway::new();
    let publisher = InMemoryEventPublisher::new();
    let orchestrator =
        OrderOrchestrator::new(store.clone(), payment.clone(), publisher.clone(), saga);

    (Arc::new(AppState { orchestrator }), store, payment, publisher)
}
