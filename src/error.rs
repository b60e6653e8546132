//! Request-boundary errors and their HTTP translation.

use crate::store::StoreError;
use crate::students::{FieldError, ValidationErrors, Violation};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced by the student handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Payload failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    /// No record matched the requested id, or the id was malformed.
    #[error("Student {id} not found")]
    NotFound {
        /// Identifier exactly as the caller supplied it.
        id: String,
    },
    /// The document store failed: an outage, or a stored document that cannot be decoded.
    #[error("Document store request failed: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Build a not-found error for the caller-supplied id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// HTTP status the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Mongo(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(StoreError::MalformedDocument(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Validation(errors) => {
                tracing::debug!(errors = errors.errors.len(), "Rejected student payload");
                json!({ "detail": errors.errors })
            }
            Self::NotFound { id } => {
                tracing::debug!(id = %id, "Student not found");
                json!({ "detail": self.to_string() })
            }
            Self::Store(error @ StoreError::Mongo(_)) => {
                tracing::error!(error = %error, "Document store request failed");
                json!({ "detail": "Document store unavailable" })
            }
            Self::Store(error @ StoreError::MalformedDocument(_)) => {
                tracing::error!(error = %error, "Stored student record is malformed");
                json!({ "detail": "Stored student record is malformed" })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(FieldError::body(Violation::JsonInvalid, rejection.body_text()).into())
    }
}
