//! Repository interface over the clinic's two tables.
//!
//! Handlers and the sync service only ever see `dyn ClinicStore`, which lets
//! the HTTP layer and the sync adapter run against PostgreSQL in production
//! and against [`crate::mock::MemoryStore`] in tests.

pub mod appointment;
pub mod client;

use async_trait::async_trait;
use careflow_core::{
    errors::{ClinicError, ClinicResult},
    models::{
        appointment::{Appointment, AppointmentFields, AppointmentWithClient},
        client::{Client, ClientFields},
    },
    pagination::Pagination,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::DbPool;

pub const CLIENT_NOT_FOUND: &str = "Client not found";
pub const APPOINTMENT_NOT_FOUND: &str = "Appointment not found";

#[async_trait]
pub trait ClinicStore: Send + Sync {
    /// Clients ordered by name.
    async fn list_clients(&self, page: &Pagination) -> ClinicResult<Vec<Client>>;
    async fn count_clients(&self) -> ClinicResult<i64>;
    async fn get_client(&self, id: Uuid) -> ClinicResult<Option<Client>>;
    async fn find_client_by_external_id(&self, external_id: &str) -> ClinicResult<Option<Client>>;
    async fn create_client(
        &self,
        fields: &ClientFields,
        external_id: Option<String>,
    ) -> ClinicResult<Client>;
    async fn update_client(&self, id: Uuid, fields: &ClientFields) -> ClinicResult<Client>;
    async fn set_client_external_id(&self, id: Uuid, external_id: &str) -> ClinicResult<Client>;
    /// Removes the client and every appointment it owns. Returns `false` when
    /// there was no such client.
    async fn delete_client(&self, id: Uuid) -> ClinicResult<bool>;

    /// Appointments ordered by `scheduled_at`, with their client's contact details.
    async fn list_appointments(&self, page: &Pagination)
    -> ClinicResult<Vec<AppointmentWithClient>>;
    async fn count_appointments(&self) -> ClinicResult<i64>;
    async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>>;
    async fn find_appointment_by_external_id(
        &self,
        external_id: &str,
    ) -> ClinicResult<Option<Appointment>>;
    async fn scheduled_at_taken(
        &self,
        scheduled_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> ClinicResult<bool>;
    async fn create_appointment(
        &self,
        fields: &AppointmentFields,
        external_id: Option<String>,
    ) -> ClinicResult<Appointment>;
    async fn update_appointment(
        &self,
        id: Uuid,
        fields: &AppointmentFields,
    ) -> ClinicResult<Appointment>;
    async fn set_appointment_external_id(
        &self,
        id: Uuid,
        external_id: &str,
    ) -> ClinicResult<Appointment>;
    async fn delete_appointment(&self, id: Uuid) -> ClinicResult<bool>;
}

/// [`ClinicStore`] backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn client_not_found() -> ClinicError {
    ClinicError::NotFound(CLIENT_NOT_FOUND.to_string())
}

fn appointment_not_found() -> ClinicError {
    ClinicError::NotFound(APPOINTMENT_NOT_FOUND.to_string())
}

#[async_trait]
impl ClinicStore for PgStore {
    async fn list_clients(&self, page: &Pagination) -> ClinicResult<Vec<Client>> {
        let rows = client::list_clients(&self.pool, page.limit(), page.offset()).await?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn count_clients(&self) -> ClinicResult<i64> {
        Ok(client::count_clients(&self.pool).await?)
    }

    async fn get_client(&self, id: Uuid) -> ClinicResult<Option<Client>> {
        Ok(client::get_client_by_id(&self.pool, id).await?.map(Client::from))
    }

    async fn find_client_by_external_id(&self, external_id: &str) -> ClinicResult<Option<Client>> {
        Ok(client::get_client_by_external_id(&self.pool, external_id)
            .await?
            .map(Client::from))
    }

    async fn create_client(
        &self,
        fields: &ClientFields,
        external_id: Option<String>,
    ) -> ClinicResult<Client> {
        Ok(client::create_client(&self.pool, fields, external_id.as_deref())
            .await?
            .into())
    }

    async fn update_client(&self, id: Uuid, fields: &ClientFields) -> ClinicResult<Client> {
        client::update_client(&self.pool, id, fields)
            .await?
            .map(Client::from)
            .ok_or_else(client_not_found)
    }

    async fn set_client_external_id(&self, id: Uuid, external_id: &str) -> ClinicResult<Client> {
        client::set_client_external_id(&self.pool, id, external_id)
            .await?
            .map(Client::from)
            .ok_or_else(client_not_found)
    }

    async fn delete_client(&self, id: Uuid) -> ClinicResult<bool> {
        Ok(client::delete_client(&self.pool, id).await?)
    }

    async fn list_appointments(
        &self,
        page: &Pagination,
    ) -> ClinicResult<Vec<AppointmentWithClient>> {
        let rows =
            appointment::list_appointments(&self.pool, page.limit(), page.offset()).await?;
        Ok(rows.into_iter().map(AppointmentWithClient::from).collect())
    }

    async fn count_appointments(&self) -> ClinicResult<i64> {
        Ok(appointment::count_appointments(&self.pool).await?)
    }

    async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>> {
        Ok(appointment::get_appointment_by_id(&self.pool, id)
            .await?
            .map(Appointment::from))
    }

    async fn find_appointment_by_external_id(
        &self,
        external_id: &str,
    ) -> ClinicResult<Option<Appointment>> {
        Ok(
            appointment::get_appointment_by_external_id(&self.pool, external_id)
                .await?
                .map(Appointment::from),
        )
    }

    async fn scheduled_at_taken(
        &self,
        scheduled_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> ClinicResult<bool> {
        Ok(appointment::scheduled_at_taken(&self.pool, scheduled_at, exclude).await?)
    }

    async fn create_appointment(
        &self,
        fields: &AppointmentFields,
        external_id: Option<String>,
    ) -> ClinicResult<Appointment> {
        let row =
            appointment::create_appointment(&self.pool, fields, external_id.as_deref()).await?;
        Ok(row.into())
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        fields: &AppointmentFields,
    ) -> ClinicResult<Appointment> {
        appointment::update_appointment(&self.pool, id, fields)
            .await?
            .map(Appointment::from)
            .ok_or_else(appointment_not_found)
    }

    async fn set_appointment_external_id(
        &self,
        id: Uuid,
        external_id: &str,
    ) -> ClinicResult<Appointment> {
        appointment::set_appointment_external_id(&self.pool, id, external_id)
            .await?
            .map(Appointment::from)
            .ok_or_else(appointment_not_found)
    }

    async fn delete_appointment(&self, id: Uuid) -> ClinicResult<bool> {
        Ok(appointment::delete_appointment(&self.pool, id).await?)
    }
}
