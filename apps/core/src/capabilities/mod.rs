//! # Capabilities
//!
//! External classification backends the pipeline depends on but does not
//! implement: a statistical language detector, an English binary sentiment
//! model and a multilingual 5-star sentiment model.
//!
//! ## Components
//! - `traits`: async interfaces for the three capabilities
//! - `http`: adapter for an inference sidecar serving all three
//! - `serialized`: wrapper serializing access to a non-reentrant backend

pub mod http;
pub mod serialized;
pub mod traits;

pub use http::HttpCapabilities;
pub use serialized::Serialized;
pub use traits::{EnglishSentiment, LanguageDetection, MultilingualSentiment, RawSentiment, StarRating};

use crate::error::CapabilityError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// The set of capabilities the pipeline needs, not yet verified.
#[derive(Clone)]
pub struct Capabilities {
    pub detector: Arc<dyn LanguageDetection>,
    pub english: Arc<dyn EnglishSentiment>,
    pub multilingual: Arc<dyn MultilingualSentiment>,
}

/// Capabilities that passed the startup readiness checks.
///
/// Only `preflight::prepare` produces this value, so a `ReviewAnalyzer`
/// cannot be built around a backend that failed to load.
#[derive(Clone)]
pub struct ReadyCapabilities {
    inner: Capabilities,
}

impl ReadyCapabilities {
    pub(crate) fn verified(inner: Capabilities) -> Self {
        Self { inner }
    }

    pub fn detector(&self) -> Arc<dyn LanguageDetection> {
        self.inner.detector.clone()
    }

    pub fn english(&self) -> Arc<dyn EnglishSentiment> {
        self.inner.english.clone()
    }

    pub fn multilingual(&self) -> Arc<dyn MultilingualSentiment> {
        self.inner.multilingual.clone()
    }
}

/// Runs a capability call under a time limit; an elapsed limit becomes
/// `CapabilityError::Timeout`.
pub async fn call_with_timeout<T, F>(limit: Duration, call: F) -> Result<T, CapabilityError>
where
    F: Future<Output = Result<T, CapabilityError>>,
{
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CapabilityError::Timeout(limit)),
    }
}
