use super::traits::{
    EnglishSentiment, LanguageDetection, MultilingualSentiment, RawSentiment, StarRating,
};
use crate::error::CapabilityError;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Serializes access to a capability instance.
///
/// Use this for backends whose model runtime cannot take concurrent calls
/// (e.g. a single in-process session). Callers queue on the lock in FIFO order.
pub struct Serialized<C> {
    inner: Mutex<C>,
}

impl<C> Serialized<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }
}

#[async_trait]
impl<C: LanguageDetection> LanguageDetection for Serialized<C> {
    async fn detect(&self, text: &str) -> Result<String, CapabilityError> {
        self.inner.lock().await.detect(text).await
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        LanguageDetection::ready(&*self.inner.lock().await).await
    }
}

#[async_trait]
impl<C: EnglishSentiment> EnglishSentiment for Serialized<C> {
    async fn classify_english(&self, text: &str) -> Result<RawSentiment, CapabilityError> {
        self.inner.lock().await.classify_english(text).await
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        EnglishSentiment::ready(&*self.inner.lock().await).await
    }
}

#[async_trait]
impl<C: MultilingualSentiment> MultilingualSentiment for Serialized<C> {
    async fn classify_stars(&self, text: &str) -> Result<StarRating, CapabilityError> {
        self.inner.lock().await.classify_stars(text).await
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        MultilingualSentiment::ready(&*self.inner.lock().await).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingEnglish {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl EnglishSentiment for CountingEnglish {
        async fn classify_english(&self, _text: &str) -> Result<RawSentiment, CapabilityError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(RawSentiment {
                label: "POSITIVE".to_string(),
                score: 0.9,
            })
        }
    }

    #[tokio::test]
    async fn test_serialized_calls_never_overlap() {
        let serialized = Arc::new(Serialized::new(CountingEnglish {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let capability = serialized.clone();
            handles.push(tokio::spawn(async move {
                capability.classify_english("fine app").await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let peak = serialized.inner.lock().await.peak.load(Ordering::SeqCst);
        assert_eq!(peak, 1);
    }
}
