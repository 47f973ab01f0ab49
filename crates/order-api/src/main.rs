//! Order service entry point.

use common::TelemetryConfig;
use common::telemetry::{init_tracing, shutdown_signal};
use order_api::config::Config;

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    let telemetry = TelemetryConfig::from_env("ordersvc");
    init_tracing(&telemetry);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire the saga to its collaborators
    let config = Config::from_env();
    tracing::info!(
        state_store = %config.state_store.endpoint(),
        payment = %config.payment.endpoint(),
        persistence = ?config.saga.persistence,
        "collaborators configured"
    );
    let state = match order_api::create_http_state(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to build collaborator clients");
            std::process::exit(1);
        }
    };

    // 4. Build the application
    let app = order_api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting order service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
