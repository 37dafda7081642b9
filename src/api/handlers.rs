use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::api::envelope::{service_error, ApiError, SuccessEnvelope};
use crate::api::extractors::{JsonBody, PathId};
use crate::logic;
use crate::model::{
    Insect, InsectDetail, InsectSearchHit, InsectUpdate, NewInsect, NewTree, Tree, TreeSearchHit,
    TreeUpdate,
};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// Tree handlers
pub async fn list_trees<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    logic::list_trees(&*store, &logic::tree_listing_query())
        .await
        .map(Json)
        .map_err(|e| service_error(e, "Could not list trees"))
}

pub async fn get_tree<S: Store>(
    State(store): State<AppState<S>>,
    PathId(id): PathId,
) -> Result<Json<Tree>, ApiError> {
    logic::get_tree(&*store, id)
        .await
        .map(Json)
        .map_err(|e| service_error(e, format!("Could not find tree {}", id)))
}

pub async fn create_tree<S: Store>(
    State(store): State<AppState<S>>,
    JsonBody(new_tree): JsonBody<NewTree>,
) -> Result<(StatusCode, Json<SuccessEnvelope<Tree>>), ApiError> {
    match logic::create_tree(&*store, new_tree).await {
        Ok(tree) => Ok((
            StatusCode::CREATED,
            Json(SuccessEnvelope::with_data("Successfully created new tree", tree)),
        )),
        Err(e) => Err(service_error(e, "Could not create tree")),
    }
}

pub async fn update_tree<S: Store>(
    State(store): State<AppState<S>>,
    PathId(id): PathId,
    JsonBody(update): JsonBody<TreeUpdate>,
) -> Result<Json<SuccessEnvelope<Tree>>, ApiError> {
    match logic::update_tree(&*store, id, update).await {
        Ok(tree) => Ok(Json(SuccessEnvelope::with_data(
            "Successfully updated tree",
            tree,
        ))),
        Err(e) => Err(service_error(e, format!("Could not update tree {}", id))),
    }
}

pub async fn delete_tree<S: Store>(
    State(store): State<AppState<S>>,
    PathId(id): PathId,
) -> Result<Json<SuccessEnvelope<()>>, ApiError> {
    match logic::delete_tree(&*store, id).await {
        Ok(()) => Ok(Json(SuccessEnvelope::message_only(format!(
            "Successfully removed tree {}",
            id
        )))),
        Err(e) => Err(service_error(e, format!("Could not remove tree {}", id))),
    }
}

pub async fn search_trees<S: Store>(
    State(store): State<AppState<S>>,
    Path(value): Path<String>,
) -> Result<Json<Vec<TreeSearchHit>>, ApiError> {
    logic::search_trees(&*store, &value)
        .await
        .map(Json)
        .map_err(|e| service_error(e, format!("Could not search trees for {}", value)))
}

// Insect handlers
pub async fn list_insects<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    logic::list_insects(&*store, &logic::insect_listing_query())
        .await
        .map(Json)
        .map_err(|e| service_error(e, "Could not list insects"))
}

pub async fn get_insect<S: Store>(
    State(store): State<AppState<S>>,
    PathId(id): PathId,
) -> Result<Json<InsectDetail>, ApiError> {
    logic::get_insect_detail(&*store, id)
        .await
        .map(Json)
        .map_err(|e| service_error(e, format!("Could not find insect {}", id)))
}

pub async fn create_insect<S: Store>(
    State(store): State<AppState<S>>,
    JsonBody(new_insect): JsonBody<NewInsect>,
) -> Result<(StatusCode, Json<SuccessEnvelope<Insect>>), ApiError> {
    match logic::create_insect(&*store, new_insect).await {
        Ok(insect) => Ok((
            StatusCode::CREATED,
            Json(SuccessEnvelope::with_data("Successfully created insect", insect)),
        )),
        Err(e) => Err(service_error(e, "Could not create insect")),
    }
}

pub async fn update_insect<S: Store>(
    State(store): State<AppState<S>>,
    PathId(id): PathId,
    JsonBody(update): JsonBody<InsectUpdate>,
) -> Result<Json<SuccessEnvelope<Insect>>, ApiError> {
    match logic::update_insect(&*store, id, update).await {
        Ok(insect) => Ok(Json(SuccessEnvelope::with_data(
            "Successfully updated insect",
            insect,
        ))),
        Err(e) => Err(service_error(e, format!("Could not update insect {}", id))),
    }
}

pub async fn delete_insect<S: Store>(
    State(store): State<AppState<S>>,
    PathId(id): PathId,
) -> Result<Json<SuccessEnvelope<()>>, ApiError> {
    match logic::delete_insect(&*store, id).await {
        Ok(()) => Ok(Json(SuccessEnvelope::message_only(format!(
            "Successfully removed insect {}",
            id
        )))),
        Err(e) => Err(service_error(e, format!("Could not remove insect {}", id))),
    }
}

pub async fn search_insects<S: Store>(
    State(store): State<AppState<S>>,
    Path(value): Path<String>,
) -> Result<Json<Vec<InsectSearchHit>>, ApiError> {
    logic::search_insects(&*store, &value)
        .await
        .map(Json)
        .map_err(|e| service_error(e, format!("Could not search insects for {}", value)))
}
