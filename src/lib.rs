pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{associate, associate_request, FieldViolation, ServiceError, ServiceResult};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

/// Serve the API for `store` on the configured address until shutdown
pub async fn serve_store<S: Store + 'static>(
    store: std::sync::Arc<S>,
    config: &crate::config::AppConfig,
) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log::info!("Server running on http://{}", bind_address);

    let app = routes::create_router().with_state(store);
    axum::serve(listener, app).await?;
    Ok(())
}
