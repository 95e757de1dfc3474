//! Batch summary of analyzed reviews.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};
use uuid::Uuid;

use super::language::LanguageTag;
use super::record::AnalyzedRecord;
use super::sentiment::SentimentLabel;

/// Number of themes listed in `top_themes`.
pub const TOP_THEMES: usize = 10;

/// A theme and how many reviews carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

/// Distribution of pipeline outcomes over one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub total: usize,
    pub unknown_language: usize,
    pub sentiment_errors: usize,
    pub theme_errors: usize,
    pub languages: BTreeMap<LanguageTag, usize>,
    pub sentiments: BTreeMap<SentimentLabel, usize>,
    pub sentiment_by_language: BTreeMap<LanguageTag, BTreeMap<SentimentLabel, usize>>,
    pub sentiment_by_bank: BTreeMap<String, BTreeMap<SentimentLabel, usize>>,
    pub sentiment_by_bank_language:
        BTreeMap<String, BTreeMap<LanguageTag, BTreeMap<SentimentLabel, usize>>>,
    /// Most common themes, most frequent first; ties sorted by name.
    pub top_themes: Vec<ThemeCount>,
}

impl BatchSummary {
    pub fn from_records(records: &[AnalyzedRecord]) -> Self {
        let mut summary = Self {
            run_id: Uuid::new_v4(),
            total: records.len(),
            unknown_language: 0,
            sentiment_errors: 0,
            theme_errors: 0,
            languages: BTreeMap::new(),
            sentiments: BTreeMap::new(),
            sentiment_by_language: BTreeMap::new(),
            sentiment_by_bank: BTreeMap::new(),
            sentiment_by_bank_language: BTreeMap::new(),
            top_themes: Vec::new(),
        };
        let mut theme_counts: HashMap<&str, usize> = HashMap::new();

        for record in records {
            let language = record.language();
            let label = record.sentiment_label();

            if language == LanguageTag::Unknown {
                summary.unknown_language += 1;
            }
            if label == SentimentLabel::Error {
                summary.sentiment_errors += 1;
            }
            if record.has_theme_error() {
                summary.theme_errors += 1;
            }

            *summary.languages.entry(language).or_default() += 1;
            *summary.sentiments.entry(label).or_default() += 1;
            *summary
                .sentiment_by_language
                .entry(language)
                .or_default()
                .entry(label)
                .or_default() += 1;
            *summary
                .sentiment_by_bank
                .entry(record.review().bank.clone())
                .or_default()
                .entry(label)
                .or_default() += 1;
            *summary
                .sentiment_by_bank_language
                .entry(record.review().bank.clone())
                .or_default()
                .entry(language)
                .or_default()
                .entry(label)
                .or_default() += 1;

            for theme in record.themes() {
                *theme_counts.entry(theme.as_str()).or_default() += 1;
            }
        }

        let mut top: Vec<ThemeCount> = theme_counts
            .into_iter()
            .map(|(theme, count)| ThemeCount {
                theme: theme.to_string(),
                count,
            })
            .collect();
        top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.theme.cmp(&b.theme)));
        top.truncate(TOP_THEMES);
        summary.top_themes = top;

        summary
    }

    /// True when any record carries a failure sentinel.
    pub fn has_degradation(&self) -> bool {
        self.sentiment_errors > 0 || self.theme_errors > 0
    }

    /// Writes the summary to the log.
    pub fn log(&self) {
        info!(
            run_id = %self.run_id,
            total = self.total,
            unknown_language = self.unknown_language,
            sentiment_errors = self.sentiment_errors,
            theme_errors = self.theme_errors,
            "📊 Batch summary"
        );
        info!("  Languages: {:?}", self.languages);
        info!("  Sentiments: {:?}", self.sentiments);
        for (language, counts) in &self.sentiment_by_language {
            info!("  Sentiment [{}]: {:?}", language, counts);
        }
        for (bank, counts) in &self.sentiment_by_bank {
            info!("  Sentiment [{}]: {:?}", bank, counts);
        }
        for (bank, by_language) in &self.sentiment_by_bank_language {
            for (language, counts) in by_language {
                info!("  Sentiment [{} / {}]: {:?}", bank, language, counts);
            }
        }
        let themes: Vec<String> = self
            .top_themes
            .iter()
            .map(|t| format!("{} ({})", t.theme, t.count))
            .collect();
        info!("  Top themes: {}", themes.join(", "));

        if self.has_degradation() {
            warn!(
                "⚠️ {} sentiment errors and {} theme errors in {} reviews",
                self.sentiment_errors, self.theme_errors, self.total
            );
        }
    }
}
