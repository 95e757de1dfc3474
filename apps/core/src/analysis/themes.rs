//! Theme extraction by keyword presence.
//!
//! A theme scores one point per distinct keyword found as a substring of the
//! lower-cased review. The two best-scoring themes are kept; ties keep
//! catalog order.

use super::catalog::{ThemeCatalog, ERROR_THEME, OTHER_THEME};
use super::language::LanguageTag;
use super::stage::{StageFailure, StageOutcome};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, warn};

/// Maximum number of themes attached to a review.
pub const MAX_THEMES: usize = 2;

/// Score of one theme for one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeScore {
    pub theme: String,
    pub score: usize,
}

/// Hook run on the blocking pool before scoring.
#[cfg(test)]
pub(crate) type ExtractionFault = Arc<dyn Fn(&str) + Send + Sync>;

/// Scores reviews against a theme catalog.
#[derive(Clone)]
pub struct ThemeExtractor {
    catalog: Arc<ThemeCatalog>,
    #[cfg(test)]
    fault: Option<ExtractionFault>,
}

impl ThemeExtractor {
    pub fn new(catalog: Arc<ThemeCatalog>) -> Self {
        Self {
            catalog,
            #[cfg(test)]
            fault: None,
        }
    }

    /// Runs `fault` ahead of every guarded extraction.
    #[cfg(test)]
    pub(crate) fn with_fault<F>(mut self, fault: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.fault = Some(Arc::new(fault));
        self
    }

    #[cfg(test)]
    fn before_extract(&self, text: Option<&str>) {
        if let Some(fault) = &self.fault {
            fault(text.unwrap_or_default());
        }
    }

    #[cfg(not(test))]
    fn before_extract(&self, _text: Option<&str>) {}

    /// Scores every theme, in catalog order.
    pub fn score_themes(&self, text: &str, language: LanguageTag) -> Vec<ThemeScore> {
        let text_lower = text.to_lowercase();
        self.catalog
            .themes()
            .iter()
            .map(|theme| ThemeScore {
                theme: theme.name.clone(),
                score: theme
                    .keywords_for(language)
                    .iter()
                    .filter(|keyword| text_lower.contains(keyword.as_str()))
                    .count(),
            })
            .collect()
    }

    /// Returns one or two theme names for `text`, or `[Other]` when nothing
    /// matches.
    pub fn extract(&self, text: Option<&str>, language: LanguageTag) -> Vec<String> {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return vec![OTHER_THEME.to_string()],
        };

        let mut scores = self.score_themes(text, language);
        // sort_by is stable: equal scores keep catalog order
        scores.sort_by(|a, b| b.score.cmp(&a.score));

        let themes: Vec<String> = scores
            .into_iter()
            .take(MAX_THEMES)
            .filter(|s| s.score > 0)
            .map(|s| s.theme)
            .collect();

        if themes.is_empty() {
            vec![OTHER_THEME.to_string()]
        } else {
            themes
        }
    }

    /// Runs `extract` on the blocking pool under `limit`.
    ///
    /// A panic or an elapsed limit yields `[Error]`.
    pub async fn extract_guarded(
        &self,
        text: Option<String>,
        language: LanguageTag,
        limit: Duration,
    ) -> Vec<String> {
        match self.try_extract(text, language, limit).await {
            Ok(themes) => themes,
            Err(failure) => {
                warn!(language = %language, "Theme extraction failed: {}", failure);
                vec![ERROR_THEME.to_string()]
            }
        }
    }

    async fn try_extract(
        &self,
        text: Option<String>,
        language: LanguageTag,
        limit: Duration,
    ) -> StageOutcome<Vec<String>> {
        let extractor = self.clone();
        let job = tokio::task::spawn_blocking(move || {
            extractor.before_extract(text.as_deref());
            extractor.extract(text.as_deref(), language)
        });

        match timeout(limit, job).await {
            Ok(Ok(themes)) => Ok(themes),
            Ok(Err(join_error)) => {
                error!("Theme extraction task failed: {}", join_error);
                Err(StageFailure::Panicked)
            }
            Err(_) => Err(StageFailure::Timeout),
        }
    }
}
