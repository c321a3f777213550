//! Appointment rules that need to consult the store.

use careflow_core::{
    errors::{ClinicError, ClinicResult},
    models::appointment::AppointmentFields,
    validation::{
        AppointmentDraft, CLIENT_BLANK, CLIENT_MUST_EXIST, ClientRef, SCHEDULED_AT_BLANK,
        SCHEDULED_AT_TAKEN,
    },
};
use uuid::Uuid;

use crate::repositories::ClinicStore;

/// Validates a draft against the store and returns the storable fields.
///
/// The owning client must exist and no other appointment may sit at the same
/// instant; `exclude` names the appointment being updated so that keeping its
/// own time is allowed. This is an exact-instant check, not an overlap check.
pub async fn validate_appointment(
    store: &dyn ClinicStore,
    draft: AppointmentDraft,
    exclude: Option<Uuid>,
) -> ClinicResult<AppointmentFields> {
    let mut messages = Vec::new();

    let client_id = match draft.client {
        ClientRef::Id(id) => store.get_client(id).await?.map(|client| client.id),
        ClientRef::Missing | ClientRef::Unknown => None,
    };
    if client_id.is_none() {
        messages.push(CLIENT_MUST_EXIST.to_string());
    }
    if draft.client == ClientRef::Missing {
        messages.push(CLIENT_BLANK.to_string());
    }

    match draft.scheduled_at {
        None => messages.push(SCHEDULED_AT_BLANK.to_string()),
        Some(at) => {
            if store.scheduled_at_taken(at, exclude).await? {
                messages.push(SCHEDULED_AT_TAKEN.to_string());
            }
        }
    }

    match (client_id, draft.scheduled_at) {
        (Some(client_id), Some(scheduled_at)) if messages.is_empty() => Ok(AppointmentFields {
            client_id,
            scheduled_at,
            notes: draft.notes,
        }),
        _ => Err(ClinicError::Validation(messages)),
    }
}
