pub mod appointments;
pub mod clients;

use careflow_core::errors::ClinicError;
use uuid::Uuid;

/// Parses a path id. An id that cannot name any record is reported the same
/// way as a missing record.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ClinicError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ClinicError::NotFound(not_found.to_string()))
}
