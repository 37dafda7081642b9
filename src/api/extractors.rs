use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::envelope::{error_response, ApiError};
use crate::model::Id;

/// Numeric `:id` path segment; anything else is answered with the error
/// envelope instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub Id);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                error_response(rejection.status(), "Invalid path", rejection.body_text())
            })?;

        raw.trim().parse::<Id>().map(PathId).map_err(|_| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid id {}", raw),
                "id must be an integer",
            )
        })
    }
}

/// JSON request body whose decoding failures use the error envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(reject_body(rejection)),
        }
    }
}

/// Valid JSON of the wrong shape answers 400, like a failed validation.
fn reject_body(rejection: JsonRejection) -> ApiError {
    log::warn!("Rejected request body: {}", rejection.body_text());
    let code = match rejection {
        JsonRejection::JsonDataError(_) => StatusCode::BAD_REQUEST,
        ref other => other.status(),
    };
    error_response(code, "Invalid request body", rejection.body_text())
}
