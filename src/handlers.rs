//! Resource CRUD handlers: gate, then validation, then store, then mapping.

use crate::error::AppError;
use crate::gate::Denied;
use crate::response::{ListBody, MessageBody};
use crate::state::AppState;
use crate::store::Page;
use crate::validate::RequestValidator;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Failure of a routed operation: a gate refusal (response shape owned by
/// the gate) or a core error.
pub enum RouteError {
    Denied(Denied),
    App(AppError),
}

impl From<Denied> for RouteError {
    fn from(denied: Denied) -> Self {
        RouteError::Denied(denied)
    }
}

impl From<AppError> for RouteError {
    fn from(err: AppError) -> Self {
        RouteError::App(err)
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self {
            RouteError::Denied(denied) => denied.into_response(),
            RouteError::App(err) => err.into_response(),
        }
    }
}

fn object_body(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Validation(vec![crate::schema::FieldViolation::new(
            "body",
            "payload must be a JSON object",
        )])),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let schema = state.store.schema();
    let mut page = None;
    let mut limit = None;
    let mut filters = Vec::new();
    for (key, raw) in &params {
        match key.as_str() {
            "page" => page = raw.parse().ok(),
            "limit" => limit = raw.parse().ok(),
            _ => {
                if let Some(spec) = schema.field(key) {
                    if spec.filterable {
                        filters.push((key.clone(), schema.coerce_query_value(spec, raw)));
                    }
                }
            }
        }
    }
    let result = state
        .store
        .list(&filters, Page::clamped(page, limit, state.max_page_size))
        .await?;
    Ok(Json(ListBody {
        items: result.items,
        total: result.total,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, RouteError> {
    state.gate.authorize(&headers).await?;
    let record = object_body(body)?;
    RequestValidator::validate(&record, state.store.schema())
        .map_err(AppError::Validation)?;
    let created = state.store.create(record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or(AppError::NotFound(state.store.schema().name))?;
    Ok(Json(record))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, RouteError> {
    state.gate.authorize(&headers).await?;
    let partial = object_body(body)?;
    RequestValidator::validate_partial(&partial, state.store.schema())
        .map_err(AppError::Validation)?;
    let updated = state
        .store
        .update_by_id(&id, partial)
        .await?
        .ok_or(AppError::NotFound(state.store.schema().name))?;
    Ok(Json(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, RouteError> {
    state.gate.authorize(&headers).await?;
    let schema_name = state.store.schema().name;
    if !state.store.delete_by_id(&id).await? {
        return Err(AppError::NotFound(schema_name).into());
    }
    Ok(Json(MessageBody::new(format!("{schema_name} deleted"))))
}
