//! In-memory [`ClinicStore`] used by tests across the workspace.
//!
//! It applies the same constraints as the PostgreSQL schema: unique
//! `scheduled_at`, appointments must reference an existing client, and
//! deleting a client cascades to its appointments.

use std::collections::HashMap;

use async_trait::async_trait;
use careflow_core::{
    errors::{ClinicError, ClinicResult},
    models::{
        appointment::{Appointment, AppointmentFields, AppointmentWithClient},
        client::{Client, ClientFields},
    },
    pagination::Pagination,
    validation::{CLIENT_MUST_EXIST, SCHEDULED_AT_TAKEN},
};
use chrono::{DateTime, SubsecRound, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::repositories::{APPOINTMENT_NOT_FOUND, CLIENT_NOT_FOUND, ClinicStore};

#[derive(Debug, Default)]
struct Tables {
    clients: HashMap<Uuid, Client>,
    appointments: HashMap<Uuid, Appointment>,
}

impl Tables {
    fn check_appointment(&self, fields: &AppointmentFields, exclude: Option<Uuid>) -> ClinicResult<()> {
        if !self.clients.contains_key(&fields.client_id) {
            return Err(ClinicError::invalid(CLIENT_MUST_EXIST));
        }
        let clash = self
            .appointments
            .values()
            .any(|a| a.scheduled_at == fields.scheduled_at && Some(a.id) != exclude);
        if clash {
            return Err(ClinicError::invalid(SCHEDULED_AT_TAKEN));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn window<T>(items: Vec<T>, page: &Pagination) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[async_trait]
impl ClinicStore for MemoryStore {
    async fn list_clients(&self, page: &Pagination) -> ClinicResult<Vec<Client>> {
        let tables = self.tables.lock().await;
        let mut clients: Vec<Client> = tables.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(window(clients, page))
    }

    async fn count_clients(&self) -> ClinicResult<i64> {
        Ok(self.tables.lock().await.clients.len() as i64)
    }

    async fn get_client(&self, id: Uuid) -> ClinicResult<Option<Client>> {
        Ok(self.tables.lock().await.clients.get(&id).cloned())
    }

    async fn find_client_by_external_id(&self, external_id: &str) -> ClinicResult<Option<Client>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .clients
            .values()
            .filter(|c| c.external_id.as_deref() == Some(external_id))
            .min_by_key(|c| c.created_at)
            .cloned())
    }

    async fn create_client(
        &self,
        fields: &ClientFields,
        external_id: Option<String>,
    ) -> ClinicResult<Client> {
        let now = now();
        let client = Client {
            id: Uuid::new_v4(),
            name: fields.name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            external_id,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .await
            .clients
            .insert(client.id, client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: Uuid, fields: &ClientFields) -> ClinicResult<Client> {
        let mut tables = self.tables.lock().await;
        let client = tables
            .clients
            .get_mut(&id)
            .ok_or_else(|| ClinicError::NotFound(CLIENT_NOT_FOUND.to_string()))?;
        client.name = fields.name.clone();
        client.email = fields.email.clone();
        client.phone = fields.phone.clone();
        client.updated_at = now();
        Ok(client.clone())
    }

    async fn set_client_external_id(&self, id: Uuid, external_id: &str) -> ClinicResult<Client> {
        let mut tables = self.tables.lock().await;
        let client = tables
            .clients
            .get_mut(&id)
            .ok_or_else(|| ClinicError::NotFound(CLIENT_NOT_FOUND.to_string()))?;
        client.external_id = Some(external_id.to_string());
        client.updated_at = now();
        Ok(client.clone())
    }

    async fn delete_client(&self, id: Uuid) -> ClinicResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.clients.remove(&id).is_none() {
            return Ok(false);
        }
        tables.appointments.retain(|_, a| a.client_id != id);
        Ok(true)
    }

    async fn list_appointments(
        &self,
        page: &Pagination,
    ) -> ClinicResult<Vec<AppointmentWithClient>> {
        let tables = self.tables.lock().await;
        let mut appointments: Vec<AppointmentWithClient> = tables
            .appointments
            .values()
            .filter_map(|a| {
                tables.clients.get(&a.client_id).map(|c| AppointmentWithClient {
                    appointment: a.clone(),
                    client: c.contact(),
                })
            })
            .collect();
        appointments.sort_by_key(|a| a.appointment.scheduled_at);
        Ok(window(appointments, page))
    }

    async fn count_appointments(&self) -> ClinicResult<i64> {
        Ok(self.tables.lock().await.appointments.len() as i64)
    }

    async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>> {
        Ok(self.tables.lock().await.appointments.get(&id).cloned())
    }

    async fn find_appointment_by_external_id(
        &self,
        external_id: &str,
    ) -> ClinicResult<Option<Appointment>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .appointments
            .values()
            .filter(|a| a.external_id.as_deref() == Some(external_id))
            .min_by_key(|a| a.created_at)
            .cloned())
    }

    async fn scheduled_at_taken(
        &self,
        scheduled_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> ClinicResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .appointments
            .values()
            .any(|a| a.scheduled_at == scheduled_at && Some(a.id) != exclude))
    }

    async fn create_appointment(
        &self,
        fields: &AppointmentFields,
        external_id: Option<String>,
    ) -> ClinicResult<Appointment> {
        let mut tables = self.tables.lock().await;
        tables.check_appointment(fields, None)?;

        let now = now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_id: fields.client_id,
            scheduled_at: fields.scheduled_at,
            notes: fields.notes.clone(),
            external_id,
            created_at: now,
            updated_at: now,
        };
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        fields: &AppointmentFields,
    ) -> ClinicResult<Appointment> {
        let mut tables = self.tables.lock().await;
        if !tables.appointments.contains_key(&id) {
            return Err(ClinicError::NotFound(APPOINTMENT_NOT_FOUND.to_string()));
        }
        tables.check_appointment(fields, Some(id))?;

        let appointment = tables
            .appointments
            .get_mut(&id)
            .ok_or_else(|| ClinicError::NotFound(APPOINTMENT_NOT_FOUND.to_string()))?;
        appointment.client_id = fields.client_id;
        appointment.scheduled_at = fields.scheduled_at;
        appointment.notes = fields.notes.clone();
        appointment.updated_at = now();
        Ok(appointment.clone())
    }

    async fn set_appointment_external_id(
        &self,
        id: Uuid,
        external_id: &str,
    ) -> ClinicResult<Appointment> {
        let mut tables = self.tables.lock().await;
        let appointment = tables
            .appointments
            .get_mut(&id)
            .ok_or_else(|| ClinicError::NotFound(APPOINTMENT_NOT_FOUND.to_string()))?;
        appointment.external_id = Some(external_id.to_string());
        appointment.updated_at = now();
        Ok(appointment.clone())
    }

    async fn delete_appointment(&self, id: Uuid) -> ClinicResult<bool> {
        Ok(self.tables.lock().await.appointments.remove(&id).is_some())
    }
}
