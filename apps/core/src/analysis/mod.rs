//! # Analysis Module
//!
//! Per-review classification pipeline for bank app reviews.
//!
//! ## Components
//! - `language`: script heuristic plus statistical language detection
//! - `sentiment`: routing between the English and multilingual models
//! - `catalog`: ordered theme catalog with per-language keywords
//! - `themes`: keyword-presence theme extraction
//! - `record`: output data structure
//! - `analyzer`: orchestrator, single record and batch
//! - `summary`: batch outcome distribution

pub mod analyzer;
pub mod catalog;
pub mod language;
pub mod record;
pub mod sentiment;
pub mod stage;
pub mod summary;
pub mod themes;

pub use analyzer::{PipelineSettings, ReviewAnalyzer};
pub use catalog::{KeywordSets, ThemeCatalog, ThemeDefinition, ERROR_THEME, OTHER_THEME};
pub use language::{LanguageDetector, LanguageTag};
pub use record::AnalyzedRecord;
pub use sentiment::{SentimentClassifier, SentimentLabel, SentimentResult};
pub use stage::{StageFailure, StageOutcome};
pub use summary::BatchSummary;
pub use themes::ThemeExtractor;
