//! Language detection with a script heuristic.
//!
//! Ethiopic script (U+1200..=U+137F) is strong evidence for Amharic: it wins
//! outright on short text and overrides an ambiguous statistical verdict.
//! Everything else is delegated to the statistical detector.

use crate::capabilities::{call_with_timeout, LanguageDetection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// First code point of the Ethiopic block.
const ETHIOPIC_START: u32 = 0x1200;
/// Last code point of the Ethiopic block.
const ETHIOPIC_END: u32 = 0x137F;
/// Below this many characters the statistical detector is not consulted for
/// Ethiopic text.
const SHORT_TEXT_CHARS: usize = 10;

/// Language of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    En,
    Am,
    Other,
    Unknown,
}

impl LanguageTag {
    /// Returns the language code
    pub fn code(&self) -> &'static str {
        match self {
            LanguageTag::En => "en",
            LanguageTag::Am => "am",
            LanguageTag::Other => "other",
            LanguageTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LanguageTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(LanguageTag::En),
            "am" => Ok(LanguageTag::Am),
            "other" => Ok(LanguageTag::Other),
            "unknown" => Ok(LanguageTag::Unknown),
            other => Err(format!("unknown language tag '{}'", other)),
        }
    }
}

/// True if any character lies in the Ethiopic block.
pub fn has_ethiopic_script(text: &str) -> bool {
    text.chars()
        .any(|c| (ETHIOPIC_START..=ETHIOPIC_END).contains(&(c as u32)))
}

/// Maps a statistical verdict to a tag, letting script evidence override
/// anything that is neither English nor Amharic.
fn resolve_verdict(code: &str, has_amharic: bool) -> LanguageTag {
    match code.trim().to_ascii_lowercase().as_str() {
        "am" => LanguageTag::Am,
        "en" => LanguageTag::En,
        _ if has_amharic => LanguageTag::Am,
        _ => LanguageTag::Other,
    }
}

/// Detects review language. Never fails.
#[derive(Clone)]
pub struct LanguageDetector {
    detector: Arc<dyn LanguageDetection>,
    call_timeout: Duration,
}

impl LanguageDetector {
    pub fn new(detector: Arc<dyn LanguageDetection>, call_timeout: Duration) -> Self {
        Self {
            detector,
            call_timeout,
        }
    }

    /// Classifies `text` into one of the four language tags.
    pub async fn detect(&self, text: Option<&str>) -> LanguageTag {
        let text = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return LanguageTag::Unknown,
        };

        let has_amharic = has_ethiopic_script(text);
        if has_amharic && text.chars().count() < SHORT_TEXT_CHARS {
            return LanguageTag::Am;
        }

        match call_with_timeout(self.call_timeout, self.detector.detect(text)).await {
            Ok(code) => resolve_verdict(&code, has_amharic),
            Err(e) => {
                debug!("Language detector failed: {}", e);
                if has_amharic {
                    LanguageTag::Am
                } else {
                    LanguageTag::Unknown
                }
            }
        }
    }
}
