use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::{association_handlers, handlers};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Trees
        .route(
            "/trees",
            get(handlers::list_trees::<S>).post(handlers::create_tree::<S>),
        )
        .route("/trees/search/:value", get(handlers::search_trees::<S>))
        .route(
            "/trees/:id",
            get(handlers::get_tree::<S>)
                .put(handlers::update_tree::<S>)
                .delete(handlers::delete_tree::<S>),
        )
        // Insects
        .route(
            "/insects",
            get(handlers::list_insects::<S>).post(handlers::create_insect::<S>),
        )
        .route("/insects/search/:value", get(handlers::search_insects::<S>))
        .route(
            "/insects/:id",
            get(handlers::get_insect::<S>)
                .put(handlers::update_insect::<S>)
                .delete(handlers::delete_insect::<S>),
        )
        // Joined listings and associations
        .route(
            "/trees-insects",
            get(association_handlers::list_trees_with_insects::<S>),
        )
        .route(
            "/insects-trees",
            get(association_handlers::list_insects_with_trees::<S>),
        )
        .route(
            "/associate-tree-insect",
            post(association_handlers::associate_tree_insect::<S>),
        )
        .layer(CorsLayer::permissive())
}
