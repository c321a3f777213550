use careflow_core::models::{
    appointment::{Appointment, AppointmentWithClient},
    client::{Client, ClientContact},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An appointment row joined with its client's contact columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointmentListing {
    pub id: Uuid,
    pub client_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
}

impl From<DbClient> for Client {
    fn from(row: DbClient) -> Self {
        Client {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            external_id: row.external_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DbAppointment> for Appointment {
    fn from(row: DbAppointment) -> Self {
        Appointment {
            id: row.id,
            client_id: row.client_id,
            scheduled_at: row.scheduled_at,
            notes: row.notes,
            external_id: row.external_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DbAppointmentListing> for AppointmentWithClient {
    fn from(row: DbAppointmentListing) -> Self {
        AppointmentWithClient {
            appointment: Appointment {
                id: row.id,
                client_id: row.client_id,
                scheduled_at: row.scheduled_at,
                notes: row.notes,
                external_id: row.external_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            client: ClientContact {
                name: row.client_name,
                email: row.client_email,
                phone: row.client_phone,
            },
        }
    }
}
