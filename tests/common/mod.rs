//! Shared helpers: routers over the in-memory store, request driving.
//!
//! Each integration test file compiles as its own crate, so helpers used by
//! only one file would otherwise warn as dead code.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use resource_kit::{
    book_schema, common_routes, resource_routes, AccessGate, AllowAll, AppState, BearerGate,
    MemoryStore, ResourceSchema, task_schema,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub fn books_app() -> Router {
    app(book_schema(), "/books", Arc::new(AllowAll))
}

pub fn books_app_with_token(token: &str) -> Router {
    app(book_schema(), "/books", Arc::new(BearerGate::new(token)))
}

pub fn tasks_app() -> Router {
    app(task_schema(), "/tasks", Arc::new(AllowAll))
}

fn app(schema: ResourceSchema, prefix: &str, gate: Arc<dyn AccessGate>) -> Router {
    let state = AppState {
        store: Arc::new(MemoryStore::new(schema)),
        gate,
        max_page_size: 100,
    };
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(prefix, resource_routes(state))
}

pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    request_with_headers(app, method, uri, body, &[]).await
}

pub async fn request_with_headers(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
