//! Payment collaborator.
//!
//! Stands in for a payment provider: every charge is approved except for a
//! configurable random share that fails with `500`.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use common::http::observability_routes;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

pub use routes::pay::PaymentState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<PaymentState>, metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/api/pay", post(routes::pay::pay))
        .with_state(state)
        .merge(observability_routes("paymentsvc", metrics_handle))
        .layer(TraceLayer::new_for_http())
}
