use axum::{extract::State, response::Json};

use crate::api::envelope::{service_error, ApiError, SuccessEnvelope};
use crate::api::extractors::JsonBody;
use crate::api::handlers::AppState;
use crate::logic::{self, ServiceError};
use crate::model::{AssociateRequest, InsectWithTrees, TreeDetail, TreeWithInsects};
use crate::store::traits::Store;

/// `GET /trees-insects`
pub async fn list_trees_with_insects<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<TreeWithInsects>>, ApiError> {
    logic::trees_with_insects(&*store)
        .await
        .map(Json)
        .map_err(|e| service_error(e, "Could not list trees with insects"))
}

/// `GET /insects-trees`
pub async fn list_insects_with_trees<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<InsectWithTrees>>, ApiError> {
    logic::insects_with_trees(&*store)
        .await
        .map(Json)
        .map_err(|e| service_error(e, "Could not list insects with trees"))
}

/// `POST /associate-tree-insect`
pub async fn associate_tree_insect<S: Store>(
    State(store): State<AppState<S>>,
    JsonBody(request): JsonBody<AssociateRequest>,
) -> Result<Json<SuccessEnvelope<TreeDetail>>, ApiError> {
    match logic::associate_request(&*store, request).await {
        Ok(detail) => Ok(Json(SuccessEnvelope::with_data(
            "Successfully recorded information",
            detail,
        ))),
        Err(e @ ServiceError::DuplicateAssociation { .. }) => {
            let message = e.to_string();
            Err(service_error(e, message))
        }
        Err(e) => Err(service_error(e, "Could not create association")),
    }
}
