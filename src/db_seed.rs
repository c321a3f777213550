use careflow_api::config::{database_url_from_env, log_level_from_env};
use careflow_db::{create_pool, repositories::PgStore, schema::initialize_database, seed::seed_database};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    careflow_api::init_tracing(log_level_from_env())?;

    let db_pool = create_pool(&database_url_from_env()?).await?;
    initialize_database(&db_pool).await?;

    let store = PgStore::new(db_pool);
    let created = seed_database(&store).await?;

    if created == 0 {
        info!("Database already has clients, nothing seeded");
    } else {
        info!("Seeded {} clients with one appointment each", created);
    }

    Ok(())
}
