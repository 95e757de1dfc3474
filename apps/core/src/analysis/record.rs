//! Analyzed Record - output structure of the review pipeline.
//!
//! Wraps the input review unchanged and adds the three stage results.

use serde::Serialize;

use super::catalog::ERROR_THEME;
use super::language::LanguageTag;
use super::sentiment::{SentimentLabel, SentimentResult};
use crate::models::ReviewRecord;

/// A review plus its language, sentiment and themes.
///
/// Always complete: a stage that failed contributes its sentinel
/// (`unknown`, `ERROR`/0.0, `[Error]`) instead of a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedRecord {
    #[serde(flatten)]
    review: ReviewRecord,
    language: LanguageTag,
    sentiment: SentimentResult,
    themes: Vec<String>,
}

impl AnalyzedRecord {
    pub(crate) fn new(
        review: ReviewRecord,
        language: LanguageTag,
        sentiment: SentimentResult,
        themes: Vec<String>,
    ) -> Self {
        Self {
            review,
            language,
            sentiment,
            themes,
        }
    }

    /// Record whose analysis could not run at all.
    pub(crate) fn degraded(review: ReviewRecord) -> Self {
        Self::new(
            review,
            LanguageTag::Unknown,
            SentimentResult::error(),
            vec![ERROR_THEME.to_string()],
        )
    }

    pub fn review(&self) -> &ReviewRecord {
        &self.review
    }

    pub fn language(&self) -> LanguageTag {
        self.language
    }

    pub fn sentiment(&self) -> SentimentResult {
        self.sentiment
    }

    pub fn sentiment_label(&self) -> SentimentLabel {
        self.sentiment.label()
    }

    pub fn sentiment_score(&self) -> f32 {
        self.sentiment.score()
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn has_theme_error(&self) -> bool {
        self.themes.iter().any(|t| t == ERROR_THEME)
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Bank: {}, Language: {}, Sentiment: {} ({:.2}), Themes: [{}]",
            self.review.bank,
            self.language,
            self.sentiment.label(),
            self.sentiment.score(),
            self.themes.join(", ")
        )
    }
}
