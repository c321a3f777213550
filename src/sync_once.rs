//! Runs one full pull from the external API and exits.

use std::sync::Arc;

use careflow_api::config::{database_url_from_env, log_level_from_env};
use careflow_db::{create_pool, repositories::PgStore, schema::initialize_database};
use careflow_sync::{ExternalSyncService, HttpRemoteApi, SyncConfig};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    careflow_api::init_tracing(log_level_from_env())?;

    let sync_config = SyncConfig::from_env()?;
    let db_pool = create_pool(&database_url_from_env()?).await?;
    initialize_database(&db_pool).await?;

    let store = Arc::new(PgStore::new(db_pool));
    let remote = Arc::new(HttpRemoteApi::new(&sync_config)?);
    let service = ExternalSyncService::new(store, remote);

    info!("Pulling from {}", sync_config.base_url);
    let summary = service.sync_all().await;
    info!(
        clients_created = summary.clients.created,
        clients_updated = summary.clients.updated,
        appointments_created = summary.appointments.created,
        appointments_updated = summary.appointments.updated,
        skipped = summary.clients.skipped + summary.appointments.skipped,
        "Sync finished"
    );

    Ok(())
}
