//! HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use maintenance_lib::{
    ArtifactError, ModelUnavailableError, ServiceError, StoreError, ValidationError,
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Request body is not a valid reading
    Validation(ValidationError),
    ModelUnavailable,
    NotFound(String),
    /// The request cannot apply to the current state
    Conflict(String),
    /// Model reload failed; the previous model keeps serving
    ModelLoad(String),
    Store(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, reason, field) = match &self {
            ApiError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                e.to_string(),
                e.field().map(str::to_string),
            ),
            ApiError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "model_unavailable",
                ModelUnavailableError.to_string(),
                None,
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            ApiError::ModelLoad(msg) => {
                tracing::error!(error = %msg, "Model reload failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "model_load_failed", msg.clone(), None)
            }
            ApiError::Store(msg) => {
                tracing::error!(error = %msg, "Component store error");
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg.clone(), None)
            }
        };

        let mut body = json!({
            "error": error,
            "reason": reason,
            "status": status.as_u16(),
        });
        if let Some(field) = field {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::Validation(e),
            ServiceError::ModelUnavailable(_) => ApiError::ModelUnavailable,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(ValidationError::Malformed(rejection.body_text()))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err.to_string())
    }
}

impl From<ArtifactError> for ApiError {
    fn from(err: ArtifactError) -> Self {
        ApiError::ModelLoad(err.to_string())
    }
}
