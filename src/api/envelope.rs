use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::logic::ServiceError;

/// `{status: "success", message, data}` body returned by mutating endpoints
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> SuccessEnvelope<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        }
    }
}

impl SuccessEnvelope<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: &'static str,
    pub message: String,
    pub details: String,
}

pub type ApiError = (StatusCode, Json<ErrorEnvelope>);

pub fn error_response(
    code: StatusCode,
    message: impl Into<String>,
    details: impl Into<String>,
) -> ApiError {
    let status = if code == StatusCode::NOT_FOUND {
        "not-found"
    } else {
        "error"
    };
    (
        code,
        Json(ErrorEnvelope {
            status,
            message: message.into(),
            details: details.into(),
        }),
    )
}

/// Translate a service failure into the error envelope, using `message` as
/// the operation-level summary.
pub fn service_error(err: ServiceError, message: impl Into<String>) -> ApiError {
    let code = match &err {
        ServiceError::Validation { .. } | ServiceError::IdMismatch { .. } => StatusCode::BAD_REQUEST,
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::DuplicateAssociation { .. } => StatusCode::CONFLICT,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = message.into();
    if code.is_server_error() {
        log::error!("{}: {:#}", message, err);
    } else {
        log::warn!("{}: {}", message, err);
    }
    error_response(code, message, err.details())
}
