//! Field-level validation rules for clients and appointments.
//!
//! Rules that need the data store (client existence, uniqueness of
//! `scheduled_at`) live in `careflow-db`; this module only covers what can be
//! decided from the submitted values.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{ClinicError, ClinicResult};
use crate::models::appointment::{Appointment, AppointmentParams};
use crate::models::client::{ClientFields, ClientParams};

pub const NAME_BLANK: &str = "Name can't be blank";
pub const EMAIL_BLANK: &str = "Email can't be blank";
pub const EMAIL_INVALID: &str = "Email is invalid";
pub const PHONE_BLANK: &str = "Phone can't be blank";
pub const CLIENT_MUST_EXIST: &str = "Client must exist";
pub const CLIENT_BLANK: &str = "Client can't be blank";
pub const SCHEDULED_AT_BLANK: &str = "Scheduled at can't be blank";
pub const SCHEDULED_AT_TAKEN: &str = "Scheduled at has already been taken";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Parses a submitted timestamp into a UTC instant with microsecond precision.
///
/// RFC 3339 values keep their offset; naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc())
        })?;

    Some(parsed.trunc_subsecs(6))
}

/// Checks the presence and format rules of a client and returns the storable
/// fields, or every failed rule at once.
pub fn validate_client(params: &ClientParams) -> ClinicResult<ClientFields> {
    let mut messages = Vec::new();

    if is_blank(params.name.as_deref()) {
        messages.push(NAME_BLANK.to_string());
    }
    if is_blank(params.email.as_deref()) {
        messages.push(EMAIL_BLANK.to_string());
    }
    if is_blank(params.phone.as_deref()) {
        messages.push(PHONE_BLANK.to_string());
    }
    if let Some(email) = params.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !is_valid_email(email) {
            messages.push(EMAIL_INVALID.to_string());
        }
    }

    match (&params.name, &params.email, &params.phone) {
        (Some(name), Some(email), Some(phone)) if messages.is_empty() => Ok(ClientFields {
            name: name.clone(),
            email: email.clone(),
            phone: phone.clone(),
        }),
        _ => Err(ClinicError::Validation(messages)),
    }
}

/// How an appointment refers to its client before the reference is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRef {
    /// No client id was supplied.
    Missing,
    /// A client id was supplied but cannot name any client.
    Unknown,
    Id(Uuid),
}

impl ClientRef {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ClientRef::Missing,
            Some(value) => Uuid::parse_str(value)
                .map(ClientRef::Id)
                .unwrap_or(ClientRef::Unknown),
        }
    }

    /// Reads a submitted `client_id`. `null` counts as missing; numbers and
    /// other non-string values cannot name a client.
    pub fn from_value(raw: Option<&Value>) -> Self {
        match raw {
            None | Some(Value::Null) => ClientRef::Missing,
            Some(Value::String(value)) => ClientRef::parse(Some(value)),
            Some(_) => ClientRef::Unknown,
        }
    }
}

/// Appointment attributes after parsing but before store-backed checks.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub client: ClientRef,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl AppointmentDraft {
    pub fn from_params(params: &AppointmentParams) -> Self {
        Self {
            client: ClientRef::from_value(params.client_id.as_ref().and_then(|v| v.as_ref())),
            scheduled_at: params
                .scheduled_at
                .as_ref()
                .and_then(|raw| raw.as_deref())
                .and_then(parse_timestamp),
            notes: params.notes.clone().flatten(),
        }
    }

    /// Overlays the supplied params on a stored appointment; keys the caller
    /// left out keep their stored values, an explicit `null` blanks them.
    pub fn merged(stored: &Appointment, params: &AppointmentParams) -> Self {
        let client = match &params.client_id {
            Some(raw) => ClientRef::from_value(raw.as_ref()),
            None => ClientRef::Id(stored.client_id),
        };
        let scheduled_at = match &params.scheduled_at {
            Some(raw) => raw.as_deref().and_then(parse_timestamp),
            None => Some(stored.scheduled_at),
        };
        let notes = match &params.notes {
            Some(notes) => notes.clone(),
            None => stored.notes.clone(),
        };

        Self {
            client,
            scheduled_at,
            notes,
        }
    }
}
