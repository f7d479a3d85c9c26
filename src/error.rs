//! Typed errors and HTTP mapping.

use crate::response::{ErrorListBody, MessageBody};
use crate::schema::FieldViolation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Resource display name; renders as "<Name> not found".
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("validation failed")]
    Validation(Vec<FieldViolation>),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("persistence: {0}")]
    Persistence(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ErrorListBody { errors })).into_response()
            }
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                Json(MessageBody::new(format!("{resource} not found"))),
            )
                .into_response(),
            // The raw cause stays server-side; callers get a generic body.
            AppError::Database(err) => {
                tracing::error!(error = %err, "database failure");
                internal_error()
            }
            AppError::Persistence(message) => {
                tracing::error!(%message, "persistence failure");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageBody::new("internal server error")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = AppError::Validation(vec![FieldViolation::new("title", "title is required")]);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::NotFound("Book");
        assert_eq!(err.to_string(), "Book not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn persistence_maps_to_500() {
        let err = AppError::Persistence("duplicate value for isbn".into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
