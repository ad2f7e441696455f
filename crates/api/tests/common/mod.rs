use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use hatch_api::config::ServerConfig;
use hatch_api::router::build_app_router;
use hatch_api::state::AppState;
use hatch_api::webhooks::WebhookRouter;
use hatch_crm::{CrmClient, CrmConfig, OwnershipCache, TokenResolver};
use hatch_events::{AnalyticsClient, StatusBroker};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the shared application state over the given pool.
///
/// The CRM base URL points at an unroutable local port so any
/// accidental platform call fails fast instead of leaving the test
/// hanging on a real network.
pub fn build_test_state(pool: PgPool) -> AppState {
    let crm_config = CrmConfig {
        api_base_url: "http://127.0.0.1:1".to_string(),
        client_id: None,
        client_secret: None,
    };
    let crm = Arc::new(CrmClient::new(&crm_config));
    let ownership = Arc::new(OwnershipCache::new(pool.clone(), Arc::clone(&crm)));
    let tokens = Arc::new(TokenResolver::new(
        pool.clone(),
        Arc::clone(&crm),
        crm_config,
        Arc::clone(&ownership),
    ));
    let broker = Arc::new(StatusBroker::new(pool.clone()));
    let analytics = Arc::new(AnalyticsClient::new(None));
    let webhook_router = Arc::new(WebhookRouter::new(
        pool.clone(),
        Arc::clone(&broker),
        analytics,
    ));

    AppState {
        pool,
        config: Arc::new(test_config()),
        crm,
        tokens,
        broker,
        webhook_router,
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_from_state(build_test_state(pool))
}

/// Build the application router over pre-built state (for tests that
/// also need direct access to the broker or resolver).
pub fn build_app_from_state(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config)
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a PATCH request with a JSON body against the app.
pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PATCH")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with no body against the app.
pub async fn post(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Deserialize a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a response is a 400 with a `VALIDATION_ERROR`-class code.
pub async fn assert_validation_error(response: Response<Body>) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].is_string());
}
