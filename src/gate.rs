//! Access gate: opaque authorization check in front of mutating routes.
//!
//! The gate owns its denial response; the core only forwards it. Swap the
//! implementation to change the authorization scheme without touching the
//! router or stores.

use crate::response::MessageBody;
use crate::settings::Settings;
use async_trait::async_trait;
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Gate-defined refusal: status and message come from the gate, not the core.
#[derive(Clone, Debug)]
pub struct Denied {
    pub status: StatusCode,
    pub message: String,
}

impl Denied {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl IntoResponse for Denied {
    fn into_response(self) -> Response {
        (self.status, Json(MessageBody::new(self.message))).into_response()
    }
}

#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn authorize(&self, headers: &HeaderMap) -> Result<(), Denied>;
}

/// Compares `Authorization: Bearer <token>` against a configured token.
pub struct BearerGate {
    token: String,
}

impl BearerGate {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessGate for BearerGate {
    async fn authorize(&self, headers: &HeaderMap) -> Result<(), Denied> {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        match presented {
            Some(token) if token == self.token => Ok(()),
            _ => Err(Denied::unauthorized("invalid or missing token")),
        }
    }
}

/// Gate that admits everything.
pub struct AllowAll;

#[async_trait]
impl AccessGate for AllowAll {
    async fn authorize(&self, _headers: &HeaderMap) -> Result<(), Denied> {
        Ok(())
    }
}

/// Gate for the configured environment: token-checked when `API_TOKEN` is
/// set, otherwise wide open (logged loudly).
pub fn from_settings(settings: &Settings) -> Arc<dyn AccessGate> {
    match &settings.api_token {
        Some(token) => Arc::new(BearerGate::new(token.clone())),
        None => {
            tracing::warn!("API_TOKEN not set; mutating routes are unprotected");
            Arc::new(AllowAll)
        }
    }
}
