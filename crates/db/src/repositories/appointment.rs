use crate::models::{DbAppointment, DbAppointmentListing};
use careflow_core::{
    errors::{ClinicError, ClinicResult},
    models::appointment::AppointmentFields,
    validation::{CLIENT_MUST_EXIST, SCHEDULED_AT_TAKEN},
};
use chrono::{DateTime, SubsecRound, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str =
    "id, client_id, scheduled_at, notes, external_id, created_at, updated_at";

/// Maps constraint violations raised by a write to the validation messages
/// the application check would have produced.
fn map_write_error(err: sqlx::Error) -> ClinicError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return ClinicError::invalid(SCHEDULED_AT_TAKEN);
        }
        if db_err.is_foreign_key_violation() {
            return ClinicError::invalid(CLIENT_MUST_EXIST);
        }
    }
    ClinicError::Database(err.into())
}

pub async fn create_appointment(
    pool: &Pool<Postgres>,
    fields: &AppointmentFields,
    external_id: Option<&str>,
) -> ClinicResult<DbAppointment> {
    let id = Uuid::new_v4();
    let now = Utc::now().trunc_subsecs(6);

    tracing::debug!(
        "Creating appointment: id={}, client_id={}, scheduled_at={}",
        id, fields.client_id, fields.scheduled_at
    );

    sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (id, client_id, scheduled_at, notes, external_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(fields.client_id)
    .bind(fields.scheduled_at)
    .bind(fields.notes.as_deref())
    .bind(external_id)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(map_write_error)
}

pub async fn list_appointments(
    pool: &Pool<Postgres>,
    limit: i64,
    offset: i64,
) -> Result<Vec<DbAppointmentListing>> {
    let appointments = sqlx::query_as::<_, DbAppointmentListing>(
        r#"
        SELECT a.id, a.client_id, a.scheduled_at, a.notes, a.external_id,
               a.created_at, a.updated_at,
               c.name AS client_name, c.email AS client_email, c.phone AS client_phone
        FROM appointments a
        JOIN clients c ON c.id = a.client_id
        ORDER BY a.scheduled_at ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn count_appointments(pool: &Pool<Postgres>) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments")
        .fetch_one(pool)
        .await?;

    Ok(total)
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment_by_external_id(
    pool: &Pool<Postgres>,
    external_id: &str,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE external_id = $1
        ORDER BY created_at ASC
        LIMIT 1
        "#
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Whether any appointment other than `exclude` sits at exactly `scheduled_at`.
pub async fn scheduled_at_taken(
    pool: &Pool<Postgres>,
    scheduled_at: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM appointments
            WHERE scheduled_at = $1 AND ($2::uuid IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(scheduled_at)
    .bind(exclude)
    .fetch_one(pool)
    .await?;

    Ok(taken)
}

pub async fn update_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    fields: &AppointmentFields,
) -> ClinicResult<Option<DbAppointment>> {
    sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET client_id = $2, scheduled_at = $3, notes = $4, updated_at = $5
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(fields.client_id)
    .bind(fields.scheduled_at)
    .bind(fields.notes.as_deref())
    .bind(Utc::now().trunc_subsecs(6))
    .fetch_optional(pool)
    .await
    .map_err(map_write_error)
}

pub async fn set_appointment_external_id(
    pool: &Pool<Postgres>,
    id: Uuid,
    external_id: &str,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET external_id = $2, updated_at = $3
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(external_id)
    .bind(Utc::now().trunc_subsecs(6))
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn delete_appointment(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
