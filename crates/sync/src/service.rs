use std::sync::Arc;

use careflow_core::{
    errors::{ClinicError, ClinicResult},
    models::{
        appointment::Appointment,
        client::{Client, ClientParams},
    },
    validation::{AppointmentDraft, ClientRef, parse_timestamp, validate_client},
};
use careflow_db::{repositories::ClinicStore, rules::validate_appointment};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::remote::{APPOINTMENTS_PATH, CLIENTS_PATH, RemoteApi};

/// Outcome counts of one pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records in the remote payload
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    /// Records left alone: unknown client, missing id or failed validation
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub clients: SyncReport,
    pub appointments: SyncReport,
}

enum Upsert {
    Created,
    Updated,
    /// The record refers to a client that is not mirrored locally.
    Unmatched,
}

impl SyncReport {
    fn record(&mut self, outcome: ClinicResult<Upsert>, kind: &str, record: &Value) {
        match outcome {
            Ok(Upsert::Created) => self.created += 1,
            Ok(Upsert::Updated) => self.updated += 1,
            Ok(Upsert::Unmatched) => {
                debug!("Skipping remote {} with unknown client: {}", kind, record);
                self.skipped += 1;
            }
            Err(err) => {
                warn!("Skipping remote {} {}: {}", kind, record, err);
                self.skipped += 1;
            }
        }
    }
}

/// Reconciles local records with the external system of record.
pub struct ExternalSyncService {
    store: Arc<dyn ClinicStore>,
    remote: Arc<dyn RemoteApi>,
}

impl ExternalSyncService {
    pub fn new(store: Arc<dyn ClinicStore>, remote: Arc<dyn RemoteApi>) -> Self {
        Self { store, remote }
    }

    /// Pulls clients first so that appointments can resolve their owners.
    pub async fn sync_all(&self) -> SyncSummary {
        let clients = self.sync_clients().await;
        let appointments = self.sync_appointments().await;
        info!(?clients, ?appointments, "External sync finished");
        SyncSummary {
            clients,
            appointments,
        }
    }

    /// Mirrors the remote client list into local clients keyed by external id.
    ///
    /// A payload that is not an array means there is nothing to sync.
    pub async fn sync_clients(&self) -> SyncReport {
        let Some(records) = self.fetch_list(CLIENTS_PATH).await else {
            return SyncReport::default();
        };

        let mut report = SyncReport {
            fetched: records.len(),
            ..Default::default()
        };
        for record in &records {
            let outcome = self.upsert_client(record).await;
            report.record(outcome, "client", record);
        }

        info!(?report, "Synced clients");
        report
    }

    /// Mirrors the remote appointment list. Entries whose `client_id` matches
    /// no local client's external id are skipped.
    pub async fn sync_appointments(&self) -> SyncReport {
        let Some(records) = self.fetch_list(APPOINTMENTS_PATH).await else {
            return SyncReport::default();
        };

        let mut report = SyncReport {
            fetched: records.len(),
            ..Default::default()
        };
        for record in &records {
            let outcome = self.upsert_appointment(record).await;
            report.record(outcome, "appointment", record);
        }

        info!(?report, "Synced appointments");
        report
    }

    /// Sends a newly created client to the remote API and stores the id it
    /// assigns. Returns the updated client, or `None` if anything failed.
    pub async fn push_client(&self, client: &Client) -> Option<Client> {
        let payload = json!({
            "name": client.name,
            "email": client.email,
            "phone": client.phone,
        });

        let response = self.remote.post_json(CLIENTS_PATH, payload).await?;
        let Some(external_id) = external_id_of(response.get("id")) else {
            warn!(client_id = %client.id, "Remote API returned no id for pushed client");
            return None;
        };

        match self.store.set_client_external_id(client.id, &external_id).await {
            Ok(updated) => {
                info!(client_id = %client.id, %external_id, "Pushed client to external API");
                Some(updated)
            }
            Err(err) => {
                error!(client_id = %client.id, "Failed to store external id: {}", err);
                None
            }
        }
    }

    /// Sends a newly created appointment to the remote API and stores the id
    /// it assigns. The payload names the owning client by its external id.
    pub async fn push_appointment(&self, appointment: &Appointment) -> Option<Appointment> {
        let client_external_id = match self.store.get_client(appointment.client_id).await {
            Ok(client) => client.and_then(|c| c.external_id),
            Err(err) => {
                error!(appointment_id = %appointment.id, "Failed to load client for push: {}", err);
                return None;
            }
        };

        let payload = json!({
            "client_id": client_external_id,
            "scheduled_at": appointment.scheduled_at,
            "notes": appointment.notes,
        });

        let response = self.remote.post_json(APPOINTMENTS_PATH, payload).await?;
        let Some(external_id) = external_id_of(response.get("id")) else {
            warn!(appointment_id = %appointment.id, "Remote API returned no id for pushed appointment");
            return None;
        };

        match self
            .store
            .set_appointment_external_id(appointment.id, &external_id)
            .await
        {
            Ok(updated) => {
                info!(appointment_id = %appointment.id, %external_id, "Pushed appointment to external API");
                Some(updated)
            }
            Err(err) => {
                error!(appointment_id = %appointment.id, "Failed to store external id: {}", err);
                None
            }
        }
    }

    async fn fetch_list(&self, path: &str) -> Option<Vec<Value>> {
        match self.remote.get_json(path).await {
            Some(Value::Array(records)) => Some(records),
            Some(other) => {
                debug!("Remote {} payload is not a list, nothing to sync: {}", path, other);
                None
            }
            None => None,
        }
    }

    async fn upsert_client(&self, record: &Value) -> ClinicResult<Upsert> {
        let external_id = external_id_of(record.get("id"))
            .ok_or_else(|| ClinicError::invalid("Remote record has no id"))?;

        let fields = validate_client(&ClientParams {
            name: text_field(record, "name"),
            email: text_field(record, "email"),
            phone: text_field(record, "phone"),
        })?;

        match self.store.find_client_by_external_id(&external_id).await? {
            Some(existing) => {
                self.store.update_client(existing.id, &fields).await?;
                Ok(Upsert::Updated)
            }
            None => {
                self.store.create_client(&fields, Some(external_id)).await?;
                Ok(Upsert::Created)
            }
        }
    }

    async fn upsert_appointment(&self, record: &Value) -> ClinicResult<Upsert> {
        let Some(client_external_id) = external_id_of(record.get("client_id")) else {
            return Ok(Upsert::Unmatched);
        };
        let Some(client) = self
            .store
            .find_client_by_external_id(&client_external_id)
            .await?
        else {
            return Ok(Upsert::Unmatched);
        };

        let external_id = external_id_of(record.get("id"))
            .ok_or_else(|| ClinicError::invalid("Remote record has no id"))?;
        let existing = self.store.find_appointment_by_external_id(&external_id).await?;

        // `time` wins over `scheduled_at` when both are present
        let scheduled_at = text_field(record, "time")
            .or_else(|| text_field(record, "scheduled_at"))
            .and_then(|raw| parse_timestamp(&raw));

        let draft = AppointmentDraft {
            client: ClientRef::Id(client.id),
            scheduled_at,
            notes: text_field(record, "notes"),
        };
        let fields =
            validate_appointment(self.store.as_ref(), draft, existing.as_ref().map(|a| a.id))
                .await?;

        match existing {
            Some(existing) => {
                self.store.update_appointment(existing.id, &fields).await?;
                Ok(Upsert::Updated)
            }
            None => {
                self.store
                    .create_appointment(&fields, Some(external_id))
                    .await?;
                Ok(Upsert::Created)
            }
        }
    }
}

/// Remote ids arrive as strings or numbers; both map to the string form.
pub fn external_id_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
