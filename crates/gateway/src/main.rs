//! Gateway entry point.

use std::sync::Arc;

use common::TelemetryConfig;
use common::telemetry::{init_tracing, shutdown_signal};
use gateway::GatewayState;
use gateway::config::Config;

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    let telemetry = TelemetryConfig::from_env("gateway");
    init_tracing(&telemetry);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Build the upstream client
    let config = Config::from_env();
    let state = match GatewayState::new(&config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, "failed to build upstream client");
            std::process::exit(1);
        }
    };
    tracing::info!(upstream = %config.order_service_url, "forwarding orders");

    // 4. Start server
    let app = gateway::create_app(state, metrics_handle);
    let addr = config.addr();
    tracing::info!(%addr, "starting gateway");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
