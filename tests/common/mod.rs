//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use server::{build_router, InMemoryStore, LocationStore, ServerConfig, ServerState};
use std::sync::Arc;
use tower::ServiceExt;

pub fn test_config() -> ServerConfig {
    ServerConfig {
        backend: server::config::BackendKind::Memory,
        ..Default::default()
    }
}

/// Router over an empty in-memory store.
pub fn memory_app() -> Router {
    app_with_store(Arc::new(InMemoryStore::new()))
}

pub fn app_with_store(store: Arc<dyn LocationStore>) -> Router {
    app_with(test_config(), store)
}

pub fn app_with(config: ServerConfig, store: Arc<dyn LocationStore>) -> Router {
    let state = Arc::new(ServerState::new(config, store));
    build_router(state)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

/// Send a request and decode the body as JSON (`Null` when empty).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    send_request(app, builder.body(body).unwrap()).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn cafe_payload() -> Value {
    serde_json::json!({
        "name": "Cafe",
        "location": {"type": "Point", "coordinates": [106.8, -6.2]}
    })
}
