//! Review Analyzer - orchestrator of the classification pipeline.
//!
//! Runs language detection, then sentiment classification and theme
//! extraction side by side, and merges the three into an `AnalyzedRecord`.
//! Each stage runs in its own task so that a panic in one stage only costs
//! that stage its result.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

use super::catalog::ThemeCatalog;
use super::language::{LanguageDetector, LanguageTag};
use super::record::AnalyzedRecord;
use super::sentiment::{SentimentClassifier, SentimentResult};
use super::themes::ThemeExtractor;
use crate::capabilities::ReadyCapabilities;
use crate::models::ReviewRecord;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 4;
/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tuning knobs of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Records analyzed concurrently.
    pub workers: usize,
    /// Limit for each capability call and for theme extraction.
    pub call_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Main analyzer that orchestrates the three stages
#[derive(Clone)]
pub struct ReviewAnalyzer {
    language: LanguageDetector,
    sentiment: SentimentClassifier,
    themes: ThemeExtractor,
    settings: PipelineSettings,
}

impl ReviewAnalyzer {
    /// Builds the analyzer. Requires capabilities that passed preflight.
    pub fn new(
        capabilities: ReadyCapabilities,
        catalog: Arc<ThemeCatalog>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            language: LanguageDetector::new(capabilities.detector(), settings.call_timeout),
            sentiment: SentimentClassifier::new(
                capabilities.english(),
                capabilities.multilingual(),
                settings.call_timeout,
            ),
            themes: ThemeExtractor::new(catalog),
            settings,
        }
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    #[cfg(test)]
    pub(crate) fn with_theme_extractor(mut self, themes: ThemeExtractor) -> Self {
        self.themes = themes;
        self
    }

    /// Analyzes one review. Never fails: failed stages yield their sentinel.
    #[instrument(skip(self, review), fields(bank = %review.bank))]
    pub async fn analyze(&self, review: ReviewRecord) -> AnalyzedRecord {
        let text = review.text.clone();

        // 1. Detect language
        let detector = self.language.clone();
        let detect_text = text.clone();
        let detect_task = tokio::spawn(async move { detector.detect(detect_text.as_deref()).await });
        let language = match detect_task.await {
            Ok(tag) => tag,
            Err(e) => {
                error!("Language stage task failed: {}", e);
                LanguageTag::Unknown
            }
        };

        // 2. Sentiment and themes only depend on (text, language)
        let classifier = self.sentiment.clone();
        let sentiment_text = text.clone();
        let sentiment_task = tokio::spawn(async move {
            classifier
                .classify(sentiment_text.as_deref(), language)
                .await
        });
        let themes_task = self
            .themes
            .extract_guarded(text, language, self.settings.call_timeout);

        let (sentiment, themes) = tokio::join!(sentiment_task, themes_task);
        let sentiment = sentiment.unwrap_or_else(|e| {
            error!("Sentiment stage task failed: {}", e);
            SentimentResult::error()
        });

        AnalyzedRecord::new(review, language, sentiment, themes)
    }

    /// Analyzes reviews on a bounded worker pool.
    ///
    /// Output order follows input order and output length equals input
    /// length. A record whose task fails outright is degraded, the rest of
    /// the batch is unaffected.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn analyze_batch(&self, records: Vec<ReviewRecord>) -> Vec<AnalyzedRecord> {
        let start = Instant::now();
        let total = records.len();
        let workers = self.settings.workers.max(1);

        let analyzed: Vec<AnalyzedRecord> = stream::iter(records.into_iter().enumerate())
            .map(|(index, review)| {
                let analyzer = self.clone();
                let fallback = review.clone();
                async move {
                    match tokio::spawn(async move { analyzer.analyze(review).await }).await {
                        Ok(record) => record,
                        Err(e) => {
                            error!(index, "Record analysis task failed: {}", e);
                            AnalyzedRecord::degraded(fallback)
                        }
                    }
                }
            })
            .buffered(workers)
            .collect()
            .await;

        let degraded = analyzed
            .iter()
            .filter(|r| r.sentiment().is_error() || r.has_theme_error())
            .count();
        info!(
            "Analyzed {} reviews with {} workers in {}ms ({} with degraded stages)",
            total,
            workers,
            start.elapsed().as_millis(),
            degraded
        );

        analyzed
    }
}
