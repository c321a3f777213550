//! # CareFlow DB
//!
//! Persistence for clients and appointments. Callers program against the
//! [`repositories::ClinicStore`] trait; [`repositories::PgStore`] backs it
//! with PostgreSQL and [`mock::MemoryStore`] keeps everything in memory.

pub mod models;
pub mod repositories;
pub mod rules;
pub mod schema;
pub mod seed;

pub mod mock;

use eyre::{Result, WrapErr};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .wrap_err("Failed to connect to the database")?;

    Ok(pool)
}
