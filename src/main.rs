use std::sync::Arc;
use tree_insect_db::config::{AppConfig, StorageBackend};
use tree_insect_db::seed;
use tree_insect_db::serve_store;
use tree_insect_db::store::{MemoryStore, PostgresStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Info by default, sqlx query logging only at warn; RUST_LOG overrides
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    println!("Trees & Insects API");

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{} backend={:?}",
        config.server.host,
        config.server.port,
        config.database.backend
    );

    let load_seed = config.database.seed_on_start
        || std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true";

    match config.database.backend {
        StorageBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let postgres_store =
                PostgresStore::new(&database_url, config.max_connections()).await?;

            log::info!("Running database migrations...");
            postgres_store.migrate().await?;

            start(Arc::new(postgres_store), &config, load_seed).await
        }
        StorageBackend::Memory => {
            log::warn!("Using the in-memory store; data is lost on shutdown");
            start(Arc::new(MemoryStore::new()), &config, load_seed).await
        }
    }
}

async fn start<S: Store + 'static>(
    store: Arc<S>,
    config: &AppConfig,
    load_seed: bool,
) -> anyhow::Result<()> {
    if load_seed {
        log::info!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
    }

    serve_store(store, config).await
}
