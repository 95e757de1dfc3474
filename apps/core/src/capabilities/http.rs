//! HTTP adapter for an inference sidecar serving the detector and both
//! sentiment models.
//!
//! Endpoints (relative to the base URL):
//! - `GET  health` → 2xx once every model is loaded
//! - `POST detect` `{text, seed}` → `{language}`
//! - `POST sentiment/english` `{text}` → `{label, score}`
//! - `POST sentiment/multilingual` `{text}` → `{label: "N stars", score}`

use super::traits::{
    EnglishSentiment, LanguageDetection, MultilingualSentiment, RawSentiment, StarRating,
};
use super::Capabilities;
use crate::error::{AppError, CapabilityError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

// NOTE: expect() is acceptable here, the pattern is a literal.
static STAR_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([1-5])\s*stars?\s*$").expect("Invalid regex: star label pattern")
});

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    language: String,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    score: f32,
}

/// Parses a multilingual model label such as "4 stars" or "1 star".
pub fn parse_star_label(label: &str) -> Option<u8> {
    STAR_LABEL
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Client for the inference sidecar. Cheap to clone.
#[derive(Clone)]
pub struct HttpCapabilities {
    client: Client,
    base_url: Url,
    seed: u64,
}

impl HttpCapabilities {
    /// Creates a client for the sidecar at `base_url`.
    ///
    /// `request_timeout` bounds each HTTP request; `seed` is forwarded to the
    /// language detector so its verdicts are reproducible.
    pub fn new(mut base_url: Url, seed: u64, request_timeout: Duration) -> Result<Self, AppError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(request_timeout).build()?;
        info!("Inference sidecar configured at {}", base_url);

        Ok(Self {
            client,
            base_url,
            seed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Wraps this client as the three pipeline capabilities.
    pub fn into_capabilities(self) -> Capabilities {
        let shared = Arc::new(self);
        Capabilities {
            detector: shared.clone(),
            english: shared.clone(),
            multilingual: shared,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, CapabilityError> {
        self.base_url
            .join(path)
            .map_err(|e| CapabilityError::Request(format!("invalid endpoint {}: {}", path, e)))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, CapabilityError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CapabilityError::InvalidResponse(e.to_string()))
    }

    /// Probes the sidecar health endpoint.
    pub async fn health(&self) -> Result<(), CapabilityError> {
        let url = self.endpoint("health")?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            debug!("Inference sidecar healthy");
            Ok(())
        } else {
            Err(CapabilityError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl LanguageDetection for HttpCapabilities {
    async fn detect(&self, text: &str) -> Result<String, CapabilityError> {
        let request = DetectRequest {
            text,
            seed: self.seed,
        };
        let response: DetectResponse = self.post_json("detect", &request).await?;
        Ok(response.language)
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        self.health().await
    }
}

#[async_trait]
impl EnglishSentiment for HttpCapabilities {
    async fn classify_english(&self, text: &str) -> Result<RawSentiment, CapabilityError> {
        let response: ClassifyResponse = self
            .post_json("sentiment/english", &ClassifyRequest { text })
            .await?;
        Ok(RawSentiment {
            label: response.label,
            score: response.score,
        })
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        self.health().await
    }
}

#[async_trait]
impl MultilingualSentiment for HttpCapabilities {
    async fn classify_stars(&self, text: &str) -> Result<StarRating, CapabilityError> {
        let response: ClassifyResponse = self
            .post_json("sentiment/multilingual", &ClassifyRequest { text })
            .await?;
        let stars = parse_star_label(&response.label).ok_or_else(|| {
            CapabilityError::InvalidResponse(format!("unrecognized star label '{}'", response.label))
        })?;
        Ok(StarRating {
            stars,
            score: response.score,
        })
    }

    async fn ready(&self) -> Result<(), CapabilityError> {
        self.health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_star_label() {
        assert_eq!(parse_star_label("5 stars"), Some(5));
        assert_eq!(parse_star_label("1 star"), Some(1));
        assert_eq!(parse_star_label(" 3 Stars "), Some(3));
        assert_eq!(parse_star_label("6 stars"), None);
        assert_eq!(parse_star_label("POSITIVE"), None);
        assert_eq!(parse_star_label(""), None);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let base = Url::parse("http://127.0.0.1:8000/ml").unwrap();
        let client = HttpCapabilities::new(base, 0, Duration::from_secs(5)).unwrap();

        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:8000/ml/");
        assert_eq!(
            client.endpoint("sentiment/english").unwrap().as_str(),
            "http://127.0.0.1:8000/ml/sentiment/english"
        );
    }
}
