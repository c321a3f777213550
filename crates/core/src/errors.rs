use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ClinicError {
    /// Shorthand for a validation failure carrying a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        ClinicError::Validation(vec![message.into()])
    }

    /// The error raised when a required request envelope key is absent.
    pub fn missing_param(key: &str) -> Self {
        ClinicError::BadRequest(format!("param is missing or the value is empty: {}", key))
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;
