pub mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::connect_info::ConnectInfo;
use axum::http::{HeaderValue, Request};
use axum::middleware::{from_fn, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use common_oauth::{Authenticator, Identity, RestError};
use serde_json::json;
use tracing::{info_span, Instrument};
use uuid::Uuid;

pub const SERVICE_NAME: &str = "resource-gateway";
const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn build_router(authenticator: Arc<Authenticator>) -> Router {
    let authenticated_routes = Router::new()
        .route("/v1/whoami", get(whoami))
        .route("/v1/private", get(private));
    let authenticated_routes =
        common_oauth::middleware::apply(authenticated_routes, authenticator);

    Router::new()
        .route("/v1/health", get(health))
        .merge(authenticated_routes)
        .layer(from_fn(request_context))
}

async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let request_id = match req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(id) => id.to_string(),
        None => {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                req.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            id
        }
    };

    let span = info_span!(
        "http.request",
        method = %method,
        path = %path,
        request_id = %request_id
    );

    let start = Instant::now();
    let mut response = async {
        tracing::info!(
            event = "request_start",
            method = %method,
            path = %path,
            remote_addr = remote_addr.as_str(),
            request_id = %request_id
        );
        let response = next.run(req).await;
        tracing::info!(
            event = "request_end",
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            request_id = %request_id
        );
        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

async fn whoami(identity: Identity) -> Json<Identity> {
    Json(identity)
}

async fn private(identity: Identity) -> Result<Json<Identity>, RestError> {
    if !identity.is_authenticated() {
        return Err(RestError::unauthorized("a valid access token is required"));
    }
    Ok(Json(identity))
}
