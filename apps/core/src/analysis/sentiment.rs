//! Sentiment classification with language-dependent model routing.
//!
//! Amharic text goes to the multilingual 5-star model and falls back once to
//! the English model if that call fails. Every other language goes straight
//! to the English binary model. Model outputs are normalized to a canonical
//! `(label, score)` pair; any failure becomes `(ERROR, 0.0)`.

use super::language::LanguageTag;
use super::stage::{StageFailure, StageOutcome};
use crate::capabilities::{call_with_timeout, EnglishSentiment, MultilingualSentiment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Texts shorter than this (after trimming) are not worth a model call.
pub const MIN_TEXT_CHARS: usize = 3;
/// Models see at most this many characters.
pub const MAX_MODEL_CHARS: usize = 512;

/// Canonical sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    /// Classification failed for this record.
    Error,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::Error => "ERROR",
        }
    }

    /// Maps a multilingual star bucket: 4-5 positive, 1-2 negative, else neutral.
    pub fn from_stars(stars: u8) -> Self {
        match stars {
            4 | 5 => SentimentLabel::Positive,
            1 | 2 => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }

    /// Parses a label reported by a model. `ERROR` is reserved and rejected.
    fn from_model_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "POSITIVE" => Some(SentimentLabel::Positive),
            "NEGATIVE" => Some(SentimentLabel::Negative),
            "NEUTRAL" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ERROR" => Ok(SentimentLabel::Error),
            other => Self::from_model_label(other)
                .ok_or_else(|| format!("unknown sentiment label '{}'", s)),
        }
    }
}

/// Normalized sentiment of a review.
///
/// The score is always within [0, 1], and `Error` always carries 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentResult {
    label: SentimentLabel,
    score: f32,
}

impl SentimentResult {
    /// Result for text too short or empty to classify.
    pub fn neutral_default() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }

    /// Sentinel for a failed classification.
    pub fn error() -> Self {
        Self {
            label: SentimentLabel::Error,
            score: 0.0,
        }
    }

    /// Builds a computed result, clamping the score to [0, 1].
    ///
    /// A non-finite score is unusable model output.
    pub fn scored(label: SentimentLabel, score: f32) -> StageOutcome<Self> {
        if label == SentimentLabel::Error {
            return Ok(Self::error());
        }
        if !score.is_finite() {
            return Err(StageFailure::InvalidOutput(format!(
                "non-finite score {}",
                score
            )));
        }
        Ok(Self {
            label,
            score: score.clamp(0.0, 1.0),
        })
    }

    pub fn label(&self) -> SentimentLabel {
        self.label
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn is_error(&self) -> bool {
        self.label == SentimentLabel::Error
    }
}

/// Routes review text to the right sentiment model. Never fails.
#[derive(Clone)]
pub struct SentimentClassifier {
    english: Arc<dyn EnglishSentiment>,
    multilingual: Arc<dyn MultilingualSentiment>,
    call_timeout: Duration,
}

impl SentimentClassifier {
    pub fn new(
        english: Arc<dyn EnglishSentiment>,
        multilingual: Arc<dyn MultilingualSentiment>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            english,
            multilingual,
            call_timeout,
        }
    }

    /// Classifies `text` written in `language`.
    pub async fn classify(&self, text: Option<&str>, language: LanguageTag) -> SentimentResult {
        let text = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return SentimentResult::neutral_default(),
        };
        if text.chars().count() < MIN_TEXT_CHARS {
            return SentimentResult::neutral_default();
        }

        let input: String = text.chars().take(MAX_MODEL_CHARS).collect();
        match self.route(&input, language).await {
            Ok(result) => result,
            Err(failure) => {
                warn!(language = %language, "Sentiment classification failed: {}", failure);
                SentimentResult::error()
            }
        }
    }

    async fn route(&self, text: &str, language: LanguageTag) -> StageOutcome<SentimentResult> {
        match language {
            LanguageTag::Am => match self.classify_multilingual(text).await {
                Ok(result) => Ok(result),
                Err(failure) => {
                    debug!("Multilingual model failed ({}), retrying with English model", failure);
                    self.classify_english(text).await
                }
            },
            LanguageTag::En | LanguageTag::Other | LanguageTag::Unknown => {
                self.classify_english(text).await
            }
        }
    }

    async fn classify_multilingual(&self, text: &str) -> StageOutcome<SentimentResult> {
        let rating =
            call_with_timeout(self.call_timeout, self.multilingual.classify_stars(text)).await?;
        SentimentResult::scored(SentimentLabel::from_stars(rating.stars), rating.score)
    }

    async fn classify_english(&self, text: &str) -> StageOutcome<SentimentResult> {
        let raw = call_with_timeout(self.call_timeout, self.english.classify_english(text)).await?;
        let label = SentimentLabel::from_model_label(&raw.label).ok_or_else(|| {
            StageFailure::InvalidOutput(format!("unexpected label '{}'", raw.label))
        })?;
        SentimentResult::scored(label, raw.score)
    }
}
