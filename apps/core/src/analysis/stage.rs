//! Per-stage outcome type shared by the analysis stages.

use crate::error::CapabilityError;
use thiserror::Error;

/// Why an analysis stage could not produce a computed value.
///
/// Each stage maps a failure to its own sentinel (`unknown`, `ERROR`,
/// `[Error]`); the kind is kept for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error("capability call failed: {0}")]
    Capability(String),
    #[error("capability call timed out")]
    Timeout,
    #[error("unusable capability output: {0}")]
    InvalidOutput(String),
    #[error("stage task panicked")]
    Panicked,
}

pub type StageOutcome<T> = Result<T, StageFailure>;

impl From<CapabilityError> for StageFailure {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::Timeout(_) => StageFailure::Timeout,
            CapabilityError::InvalidResponse(msg) => StageFailure::InvalidOutput(msg),
            other => StageFailure::Capability(other.to_string()),
        }
    }
}
