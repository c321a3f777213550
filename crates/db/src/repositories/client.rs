use crate::models::DbClient;
use careflow_core::models::client::ClientFields;
use chrono::{SubsecRound, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const CLIENT_COLUMNS: &str = "id, name, email, phone, external_id, created_at, updated_at";

pub async fn create_client(
    pool: &Pool<Postgres>,
    fields: &ClientFields,
    external_id: Option<&str>,
) -> Result<DbClient> {
    let id = Uuid::new_v4();
    let now = Utc::now().trunc_subsecs(6);

    tracing::debug!(
        "Creating client: id={}, name={}, external_id={:?}",
        id, fields.name, external_id
    );

    let client = sqlx::query_as::<_, DbClient>(&format!(
        r#"
        INSERT INTO clients (id, name, email, phone, external_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING {CLIENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(external_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(client)
}

pub async fn list_clients(pool: &Pool<Postgres>, limit: i64, offset: i64) -> Result<Vec<DbClient>> {
    let clients = sqlx::query_as::<_, DbClient>(&format!(
        r#"
        SELECT {CLIENT_COLUMNS}
        FROM clients
        ORDER BY name ASC, id ASC
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

pub async fn count_clients(pool: &Pool<Postgres>) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients")
        .fetch_one(pool)
        .await?;

    Ok(total)
}

pub async fn get_client_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbClient>> {
    let client = sqlx::query_as::<_, DbClient>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

pub async fn get_client_by_external_id(
    pool: &Pool<Postgres>,
    external_id: &str,
) -> Result<Option<DbClient>> {
    let client = sqlx::query_as::<_, DbClient>(&format!(
        r#"
        SELECT {CLIENT_COLUMNS}
        FROM clients
        WHERE external_id = $1
        ORDER BY created_at ASC
        LIMIT 1
        "#
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

pub async fn update_client(
    pool: &Pool<Postgres>,
    id: Uuid,
    fields: &ClientFields,
) -> Result<Option<DbClient>> {
    let client = sqlx::query_as::<_, DbClient>(&format!(
        r#"
        UPDATE clients
        SET name = $2, email = $3, phone = $4, updated_at = $5
        WHERE id = $1
        RETURNING {CLIENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&fields.name)
    .bind(&fields.email)
    .bind(&fields.phone)
    .bind(Utc::now().trunc_subsecs(6))
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

pub async fn set_client_external_id(
    pool: &Pool<Postgres>,
    id: Uuid,
    external_id: &str,
) -> Result<Option<DbClient>> {
    let client = sqlx::query_as::<_, DbClient>(&format!(
        r#"
        UPDATE clients
        SET external_id = $2, updated_at = $3
        WHERE id = $1
        RETURNING {CLIENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(external_id)
    .bind(Utc::now().trunc_subsecs(6))
    .fetch_optional(pool)
    .await?;

    Ok(client)
}

/// Deletes a client; its appointments go with it through `ON DELETE CASCADE`.
pub async fn delete_client(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
