//! Health and Prometheus routes mounted by every service.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// `GET /health` and `GET /metrics` for the named service, ready to merge
/// into its router.
pub fn observability_routes(service: &'static str, metrics_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(move || health(service)))
        .route("/metrics", get(metrics))
        .with_state(metrics_handle)
}

/// GET /health: liveness of the process itself; collaborators are not contacted.
async fn health(service: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service,
    })
}

/// GET /metrics — returns Prometheus-formatted metrics.
async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    use super::*;

    fn routes() -> Router {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        observability_routes("ordersvc", handle)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_names_the_service() {
        let response = routes().oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "service": "ordersvc"}));
    }

    #[tokio::test]
    async fn metrics_are_prometheus_text() {
        let response = routes().oneshot(get_request("/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4; charset=utf-8"
        );
    }
}
