use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::client::ClientContact;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An appointment as listed, carrying its client's contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentWithClient {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub client: ClientContact,
}

/// Validated, storable appointment attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentFields {
    pub client_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Raw appointment attributes as submitted by a caller.
///
/// Every field distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`). A partial update keeps stored values for absent keys and
/// assigns the `null` otherwise. `client_id` stays untyped so that a numeric
/// id reaches validation instead of failing deserialisation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentParams {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub client_id: Option<Option<Value>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub scheduled_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub notes: Option<Option<String>>,
}

impl AppointmentParams {
    /// True when no attribute key was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.client_id.is_none() && self.scheduled_at.is_none() && self.notes.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub appointment: Option<AppointmentParams>,
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
