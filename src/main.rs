use std::sync::Arc;

use careflow_api::{ApiState, config::ApiConfig, init_tracing};
use careflow_db::{create_pool, repositories::PgStore, schema::initialize_database};
use careflow_sync::{ExternalSyncService, HttpRemoteApi, PeriodicTrigger, SyncConfig};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = ApiConfig::from_env()?;
    let sync_config = SyncConfig::from_env()?;
    init_tracing(config.log_level)?;

    info!("Starting CareFlow API");

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    let store = Arc::new(PgStore::new(db_pool));
    let remote = Arc::new(HttpRemoteApi::new(&sync_config)?);
    let sync = Arc::new(ExternalSyncService::new(store.clone(), remote));

    PeriodicTrigger::new(&sync_config, Some(sync.clone())).spawn();

    let state = Arc::new(ApiState { store, sync });
    careflow_api::start_server(config, state).await?;

    Ok(())
}
