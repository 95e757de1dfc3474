//! Review Analyzer
//!
//! Classifies bank app reviews by language, sentiment and theme, and
//! persists the results for reporting.

pub mod analysis;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod output;
pub mod preflight;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use analysis::{AnalyzedRecord, BatchSummary, PipelineSettings, ReviewAnalyzer};
pub use config::AppConfig;
pub use error::{AppError, CapabilityError};
pub use models::ReviewRecord;
