use careflow_api::config::{database_url_from_env, log_level_from_env};
use careflow_db::{create_pool, schema::initialize_database};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    careflow_api::init_tracing(log_level_from_env())?;

    let database_url = database_url_from_env()?;

    info!("Connecting to database...");
    let db_pool = create_pool(&database_url).await?;

    initialize_database(&db_pool).await?;

    Ok(())
}
