//! Scriptable capability mocks shared by the suites.

use crate::analysis::{PipelineSettings, ReviewAnalyzer, ThemeCatalog};
use crate::capabilities::{
    Capabilities, EnglishSentiment, LanguageDetection, MultilingualSentiment, RawSentiment,
    ReadyCapabilities, StarRating,
};
use crate::error::CapabilityError;
use crate::preflight;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Respond<T> = Box<dyn Fn(&str) -> Result<T, CapabilityError> + Send + Sync>;

/// A capability whose answer is computed by a closure over the input text.
pub struct Scripted<T> {
    respond: Respond<T>,
    delay: Option<Duration>,
    ready: bool,
    calls: Arc<AtomicUsize>,
}

impl<T> Scripted<T> {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<T, CapabilityError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            delay: None,
            ready: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every call fails with a request error.
    pub fn failing() -> Self {
        Self::new(|_| Err(CapabilityError::Request("backend down".to_string())))
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails its readiness probe.
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Counter of calls made so far.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    async fn answer(&self, text: &str) -> Result<T, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(text)
    }

    fn readiness(&self) -> Result<(), CapabilityError> {
        if self.ready {
            Ok(())
        } else {
            Err(CapabilityError::Request("model not loaded".to_string()))
        }
    }
}

pub type MockDetector = Scripted<String>;
pub type MockEnglish = Scripted<RawSentiment>;
pub type MockMultilingual = Scripted<StarRating>;

impl MockDetector {
    pub fn returning(code: &str) -> Self {
        let code = code.to_string();
        Self::new(move |_| Ok(code.clone()))
    }
}

impl MockEnglish {
    pub fn returning(label: &str, score: f32) -> Self {
        let label = label.to_string();
        Self::new(move |_| {
            Ok(RawSentiment {
                label: label.clone(),
                score,
            })
        })
    }
}

impl MockMultilingual {
    pub fn returning(stars: u8, score: f32) -> Self {
        Self::new(move |_| Ok(StarRating { stars, score }))
    }
}

#[async_trait]
impl LanguageDetection for Scripted<String> {
    async fn detect(&self, text: &str) -> Result<String, CapabilityError> {
        self.answer(text).await
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        self.readiness()
    }
}

#[async_trait]
impl EnglishSentiment for Scripted<RawSentiment> {
    async fn classify_english(&self, text: &str) -> Result<RawSentiment, CapabilityError> {
        self.answer(text).await
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        self.readiness()
    }
}

#[async_trait]
impl MultilingualSentiment for Scripted<StarRating> {
    async fn classify_stars(&self, text: &str) -> Result<StarRating, CapabilityError> {
        self.answer(text).await
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        self.readiness()
    }
}

pub fn capabilities(
    detector: MockDetector,
    english: MockEnglish,
    multilingual: MockMultilingual,
) -> Capabilities {
    Capabilities {
        detector: Arc::new(detector),
        english: Arc::new(english),
        multilingual: Arc::new(multilingual),
    }
}

/// Runs the mocks through preflight, panicking if any is not ready.
pub async fn ready(
    detector: MockDetector,
    english: MockEnglish,
    multilingual: MockMultilingual,
) -> ReadyCapabilities {
    preflight::prepare(
        capabilities(detector, english, multilingual),
        Duration::from_secs(1),
    )
    .await
    .expect("mock capabilities should pass preflight")
}

/// Analyzer over the built-in catalog.
pub async fn analyzer(
    detector: MockDetector,
    english: MockEnglish,
    multilingual: MockMultilingual,
    settings: PipelineSettings,
) -> ReviewAnalyzer {
    ReviewAnalyzer::new(
        ready(detector, english, multilingual).await,
        Arc::new(ThemeCatalog::builtin()),
        settings,
    )
}

/// Settings with a short per-call timeout.
pub fn fast_settings(workers: usize) -> PipelineSettings {
    PipelineSettings {
        workers,
        call_timeout: Duration::from_millis(200),
    }
}
