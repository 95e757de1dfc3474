use crate::error::CapabilityError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw verdict of the English binary sentiment model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSentiment {
    /// Label as reported by the model (e.g. "POSITIVE", "negative").
    pub label: String,
    /// Model confidence for the label.
    pub score: f32,
}

/// Raw verdict of the multilingual 5-star sentiment model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarRating {
    /// Star bucket, 1 to 5.
    pub stars: u8,
    /// Model confidence for the bucket.
    pub score: f32,
}

/// Defines the interface of the statistical language detector.
///
/// Implementations must be deterministic for a given input; seeding is the
/// implementation's concern.
#[async_trait]
pub trait LanguageDetection: Send + Sync + 'static {
    /// Returns the detected language as an ISO 639-1 code (e.g. "en", "am").
    async fn detect(&self, text: &str) -> Result<String, CapabilityError>;

    /// Reports whether the detector is loaded and able to serve requests.
    async fn ready(&self) -> Result<(), CapabilityError> {
        Ok(())
    }
}

/// Defines the interface of the English binary sentiment classifier.
#[async_trait]
pub trait EnglishSentiment: Send + Sync + 'static {
    /// Classifies text as positive or negative with a confidence.
    async fn classify_english(&self, text: &str) -> Result<RawSentiment, CapabilityError>;

    /// Reports whether the model is loaded and able to serve requests.
    async fn ready(&self) -> Result<(), CapabilityError> {
        Ok(())
    }
}

/// Defines the interface of the multilingual 5-star sentiment classifier.
#[async_trait]
pub trait MultilingualSentiment: Send + Sync + 'static {
    /// Classifies text into a 1-5 star bucket with a confidence.
    async fn classify_stars(&self, text: &str) -> Result<StarRating, CapabilityError>;

    /// Reports whether the model is loaded and able to serve requests.
    async fn ready(&self) -> Result<(), CapabilityError> {
        Ok(())
    }
}
