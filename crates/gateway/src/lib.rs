//! Public edge of the order system.
//!
//! Accepts `POST /api/order`, continues or starts the W3C trace and relays
//! the request to the order service. The gateway holds no order logic.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use common::http::observability_routes;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::order::GatewayState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<GatewayState>, metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/api/order", post(routes::order::forward))
        .with_state(state)
        .merge(observability_routes("gateway", metrics_handle))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
