use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common_oauth::client::INVALID_RESPONSE_MESSAGE;
use common_oauth::{Authenticator, ResolvedToken, RestError, TokenResolver};
use http_body_util::BodyExt;
use resource_gateway::build_router;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Token service stand-in; unknown tokens are reported as not found.
#[derive(Default)]
struct StubTokenService {
    tokens: HashMap<&'static str, Result<ResolvedToken, RestError>>,
}

impl StubTokenService {
    fn with(mut self, token: &'static str, outcome: Result<ResolvedToken, RestError>) -> Self {
        self.tokens.insert(token, outcome);
        self
    }
}

#[async_trait]
impl TokenResolver for StubTokenService {
    async fn resolve(&self, token_id: &str) -> Result<ResolvedToken, RestError> {
        self.tokens
            .get(token_id)
            .cloned()
            .unwrap_or_else(|| Err(RestError::not_found("no access token found with given id")))
    }
}

fn router() -> Router {
    let service = StubTokenService::default()
        .with(
            "Abc123",
            Ok(ResolvedToken {
                id: "1".into(),
                user_id: 2,
                client_id: 3,
            }),
        )
        .with(
            "down",
            Err(RestError::internal_server_error(INVALID_RESPONSE_MESSAGE, None)),
        );
    build_router(Arc::new(Authenticator::new(Arc::new(service))))
}

async fn get(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("response");
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).expect("json body"))
}

#[tokio::test]
async fn health_skips_authentication() {
    let request = Request::builder()
        .uri("/v1/health?access_token=down")
        .body(Body::empty())
        .unwrap();

    let (status, body) = get(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "service": "resource-gateway"}));
}

#[tokio::test]
async fn resolved_token_reaches_handler() {
    let request = Request::builder()
        .uri("/v1/whoami?access_token=Abc123")
        .body(Body::empty())
        .unwrap();

    let (status, body) = get(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"public": false, "caller_id": 2, "client_id": 3}));
}

#[tokio::test]
async fn forged_identity_never_reaches_handler() {
    for uri in [
        "/v1/whoami",
        "/v1/whoami?access_token=%20",
        "/v1/whoami?access_token=unknown",
    ] {
        let request = Request::builder()
            .uri(uri)
            .header("X-Caller-Id", "1")
            .header("X-Client-Id", "1")
            .body(Body::empty())
            .unwrap();

        let (status, body) = get(router(), request).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, json!({"public": false, "caller_id": 0, "client_id": 0}), "{uri}");
    }
}

#[tokio::test]
async fn public_marker_is_passed_through() {
    let request = Request::builder()
        .uri("/v1/whoami")
        .header("X-Public", "true")
        .body(Body::empty())
        .unwrap();

    let (_, body) = get(router(), request).await;
    assert_eq!(body["public"], true);
}

#[tokio::test]
async fn private_route_requires_identity() {
    let request = Request::builder()
        .uri("/v1/private")
        .body(Body::empty())
        .unwrap();
    let (status, body) = get(router(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let request = Request::builder()
        .uri("/v1/private?access_token=Abc123")
        .body(Body::empty())
        .unwrap();
    let (status, body) = get(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["caller_id"], 2);
}

#[tokio::test]
async fn lookup_failure_rejects_request() {
    let request = Request::builder()
        .uri("/v1/whoami?access_token=down")
        .body(Body::empty())
        .unwrap();

    let (status, body) = get(router(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], INVALID_RESPONSE_MESSAGE);
    assert_eq!(body["status"], 500);
    assert_eq!(body["error"], "internal_server_error");
}

#[tokio::test]
async fn request_id_is_echoed_or_assigned() {
    let response = router()
        .oneshot(
            Request::builder()
                .uri("/v1/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert_eq!(response.headers()["x-request-id"], "req-123");

    let response = router()
        .oneshot(
            Request::builder()
                .uri("/v1/whoami")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("response");
    assert!(response.headers().contains_key("x-request-id"));
}
