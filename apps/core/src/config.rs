//! Runtime configuration read from the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use validator::Validate;

use crate::analysis::PipelineSettings;
use crate::error::AppError;

pub const ENV_INFERENCE_URL: &str = "REVIEWS_INFERENCE_URL";
pub const ENV_WORKERS: &str = "REVIEWS_WORKERS";
pub const ENV_CALL_TIMEOUT_SECS: &str = "REVIEWS_CALL_TIMEOUT_SECS";
pub const ENV_DETECTOR_SEED: &str = "REVIEWS_DETECTOR_SEED";
pub const ENV_DATABASE_URL: &str = "REVIEWS_DATABASE_URL";
pub const ENV_THEME_CATALOG: &str = "REVIEWS_THEME_CATALOG";

const DEFAULT_INFERENCE_URL: &str = "http://127.0.0.1:8000";

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Base URL of the inference sidecar.
    #[validate(url)]
    pub inference_url: String,
    /// Records analyzed concurrently.
    #[validate(range(min = 1, max = 64))]
    pub workers: usize,
    /// Per-call timeout in seconds.
    #[validate(range(min = 1, max = 600))]
    pub call_timeout_secs: u64,
    /// Seed for the statistical language detector.
    pub detector_seed: u64,
    /// SQLite URL of the review store. Storage is skipped when unset.
    pub database_url: Option<String>,
    /// JSON theme catalog replacing the built-in one.
    pub theme_catalog: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            workers: 4,
            call_timeout_secs: 30,
            detector_seed: 0,
            database_url: None,
            theme_catalog: None,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from `REVIEWS_*` variables, falling back to
    /// defaults, and validates it.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            inference_url: env::var(ENV_INFERENCE_URL).unwrap_or(defaults.inference_url),
            workers: parse_var(ENV_WORKERS)?.unwrap_or(defaults.workers),
            call_timeout_secs: parse_var(ENV_CALL_TIMEOUT_SECS)?
                .unwrap_or(defaults.call_timeout_secs),
            detector_seed: parse_var(ENV_DETECTOR_SEED)?.unwrap_or(defaults.detector_seed),
            database_url: non_empty_var(ENV_DATABASE_URL),
            theme_catalog: non_empty_var(ENV_THEME_CATALOG).map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn inference_url(&self) -> Result<Url, AppError> {
        Ok(Url::parse(&self.inference_url)?)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            workers: self.workers,
            call_timeout: self.call_timeout(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, AppError> {
    match non_empty_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} has an invalid value '{}'", key, raw))),
        None => Ok(None),
    }
}
