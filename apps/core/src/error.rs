use std::io;
use std::time::Duration;
use thiserror::Error;

/// Application-wide error type for everything outside the per-record pipeline.
///
/// Per-record failures never surface as `AppError`; they are recovered into
/// sentinel values by the analysis stages.
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors originating from the review store, typically from `sqlx`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors reading or writing review CSV files.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors building or using the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Data validation errors (e.g., an invalid theme catalog).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors (e.g., an unparsable environment variable).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A classification capability failed to initialize or is not ready.
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// An operation did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

/// Errors returned by a classification capability call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered, but the payload is unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The call exceeded its time limit.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for CapabilityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CapabilityError::InvalidResponse(err.to_string())
        } else {
            CapabilityError::Request(err.to_string())
        }
    }
}
