//! Payment service entry point.

use std::sync::Arc;

use common::TelemetryConfig;
use common::telemetry::{init_tracing, shutdown_signal};
use payment_api::PaymentState;
use payment_api::config::Config;

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    let telemetry = TelemetryConfig::from_env("paymentsvc");
    init_tracing(&telemetry);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Build the application
    let config = Config::from_env();
    let state = Arc::new(PaymentState::from_config(&config));
    tracing::info!(failure_rate = state.failure_rate(), "payment simulation configured");
    let app = payment_api::create_app(state, metrics_handle);

    // 4. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting payment service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
