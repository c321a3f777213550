use eyre::{Result, WrapErr};
use sqlx::{Pool, Postgres};
use tracing::info;

const INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_clients_external_id ON clients(external_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_external_id ON appointments(external_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_client_id ON appointments(client_id)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create clients table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            external_id TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await
    .wrap_err("Failed to create clients table")?;

    // Create appointments table; no two appointments may share an instant
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            client_id UUID NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            scheduled_at TIMESTAMP WITH TIME ZONE NOT NULL,
            notes TEXT NULL,
            external_id TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT appointments_scheduled_at_key UNIQUE (scheduled_at)
        );
        "#,
    )
    .execute(pool)
    .await
    .wrap_err("Failed to create appointments table")?;

    // Prepared statements carry one command each
    for statement in INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .wrap_err_with(|| format!("Failed to run `{}`", statement))?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
