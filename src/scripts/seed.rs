use anyhow::{bail, Result};
use tree_insect_db::config::AppConfig;
use tree_insect_db::seed;
use tree_insect_db::store::PostgresStore;

/// Apply (`up`) or revert (`down`) the sample data against the configured database
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let direction = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let config = AppConfig::load()?;
    let database_url = config.database_url()?;
    let store = PostgresStore::new(&database_url, config.max_connections()).await?;
    store.migrate().await?;

    match direction.as_str() {
        "up" => seed::load_seed_data(&store).await?,
        "down" => seed::unload_seed_data(&store).await?,
        other => bail!("Unknown seed direction '{}', expected 'up' or 'down'", other),
    }

    println!("Seed {} complete", direction);
    Ok(())
}
