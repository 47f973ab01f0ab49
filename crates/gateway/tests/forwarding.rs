//! Gateway forwarding tests against a live order service and fake upstreams.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::routing::post;
use gateway::GatewayState;
use gateway::config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{InMemoryPaymentGateway, InMemoryStateStore, SagaConfig};
use serde_json::Value;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Serve `app` on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn gateway_for(order_service_url: String, upstream_timeout: Duration) -> Router {
    let config = Config {
        order_service_url,
        upstream_timeout,
        ..Default::default()
    };
    let state = Arc::new(GatewayState::new(&config).unwrap());
    gateway::create_app(state, get_metrics_handle())
}

/// Gateway in front of a real order service with in-memory collaborators.
async fn gateway_with_order_service() -> (Router, InMemoryStateStore, InMemoryPaymentGateway) {
    let (state, store, payment, _) = order_api::create_default_state(SagaConfig::default());
    let base_url = serve(order_api::create_app(state, get_metrics_handle())).await;
    let app = gateway_for(format!("{base_url}/api/order"), Duration::from_secs(5));
    (app, store, payment)
}

fn order_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/order")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_order_is_created_through_the_gateway() {
    let (app, store, payment) = gateway_with_order_service().await;

    let response = app
        .oneshot(order_request(r#"{"id": "abc", "amount": 50}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["id"], "abc");
    assert_eq!(json["ok"], true);
    assert_eq!(store.put_count(), 1);
    assert_eq!(payment.charge_count(), 1);
}

#[tokio::test]
async fn test_payment_failure_problem_is_relayed() {
    let (app, _, payment) = gateway_with_order_service().await;
    payment.set_decline(true);

    let response = app
        .oneshot(order_request(r#"{"id": "abc", "amount": 50}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/problem+json"
    );
    let json = json_body(response).await;
    assert_eq!(json["title"], "payment failed");
    assert_eq!(json["order_id"], "abc");
}

#[tokio::test]
async fn test_numeric_id_beyond_u64_survives_the_round_trip() {
    let (app, store, payment) = gateway_with_order_service().await;

    let response = app
        .oneshot(order_request(
            r#"{"id": 12345678901234567890123, "amount": 50}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["id"], "12345678901234567890123");
    assert_eq!(store.puts()[0].key.as_str(), "12345678901234567890123");
    assert_eq!(
        payment.charges()[0].order_id.as_str(),
        "12345678901234567890123"
    );
}

#[tokio::test]
async fn test_request_body_is_forwarded_byte_for_byte() {
    let seen: Arc<Mutex<Option<Bytes>>> = Arc::default();
    let captured = seen.clone();
    let upstream = Router::new().route(
        "/api/order",
        post(move |body: Bytes| async move {
            *captured.lock().unwrap() = Some(body);
            StatusCode::OK
        }),
    );
    let base_url = serve(upstream).await;
    let app = gateway_for(format!("{base_url}/api/order"), Duration::from_secs(5));

    let raw = "{ \"amount\" : 12.50,\n  \"id\": 1e3 }";
    let response = app.oneshot(order_request(raw)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let forwarded = seen.lock().unwrap().clone().unwrap();
    assert_eq!(&forwarded[..], raw.as_bytes());
}

#[tokio::test]
async fn test_malformed_json_is_not_forwarded() {
    let (app, store, payment) = gateway_with_order_service().await;

    let response = app.oneshot(order_request("{\"id\": ")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["title"], "malformed order payload");
    assert_eq!(store.put_count(), 0);
    assert_eq!(payment.attempt_count(), 0);
}

#[tokio::test]
async fn test_upstream_status_and_body_are_relayed_verbatim() {
    let seen: Arc<Mutex<Option<String>>> = Arc::default();
    let captured = seen.clone();
    let upstream = Router::new().route(
        "/api/order",
        post(move |headers: HeaderMap| async move {
            *captured.lock().unwrap() = headers
                .get("traceparent")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            (
                StatusCode::ACCEPTED,
                [(header::CONTENT_TYPE, "text/plain")],
                "queued",
            )
        }),
    );
    let base_url = serve(upstream).await;
    let app = gateway_for(format!("{base_url}/api/order"), Duration::from_secs(5));

    let trace_id = "4bf92f3577b34da6a3ce929d0e0e4736";
    let request = Request::builder()
        .method("POST")
        .uri("/api/order")
        .header("traceparent", format!("00-{trace_id}-00f067aa0ba902b7-01"))
        .body(Body::from(r#"{"amount": 1}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"queued");

    // Same trace, new span for the forwarded hop
    let forwarded = seen.lock().unwrap().clone().unwrap();
    assert!(forwarded.starts_with(&format!("00-{trace_id}-")));
    assert!(!forwarded.contains("00f067aa0ba902b7"));
}

#[tokio::test]
async fn test_unreachable_upstream_is_502() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let app = gateway_for(format!("http://{addr}/api/order"), Duration::from_secs(5));

    let response = app.oneshot(order_request(r#"{"amount": 1}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["title"], "upstream unavailable");
}

#[tokio::test]
async fn test_slow_upstream_is_504() {
    let upstream = Router::new().route(
        "/api/order",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            "late"
        }),
    );
    let base_url = serve(upstream).await;
    let app = gateway_for(format!("{base_url}/api/order"), Duration::from_millis(50));

    let response = app.oneshot(order_request(r#"{"amount": 1}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json_body(response).await["title"], "upstream timeout");
}

#[tokio::test]
async fn test_health_check() {
    let app = gateway_for("http://127.0.0.1:9/api/order".to_string(), Duration::from_secs(1));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}
