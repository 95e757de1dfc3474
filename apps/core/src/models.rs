use serde::{Deserialize, Deserializer, Serialize};

/// Text values upstream exports use for a missing review.
const MISSING_TEXT_MARKERS: &[&str] = &[
    "nan", "-nan", "none", "null", "n/a", "na", "<na>", "#n/a", "#na",
];

/// A raw review row as collected upstream.
///
/// Field names follow the ingestion CSV: `review, rating, date, bank, source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// The review text. `None` when absent, blank or a NaN-like marker.
    #[serde(rename = "review", default, deserialize_with = "deserialize_text")]
    pub text: Option<String>,
    /// Star rating given by the reviewer, 1 to 5.
    #[serde(default, deserialize_with = "deserialize_rating")]
    pub rating: Option<u8>,
    /// Review date as provided upstream (normalized to `YYYY-MM-DD` by cleaning).
    #[serde(default)]
    pub date: String,
    /// Name of the bank whose app is reviewed.
    pub bank: String,
    /// Where the review was collected (e.g. "Google Play").
    #[serde(default)]
    pub source: String,
}

impl ReviewRecord {
    /// Builds a record, normalizing the text the same way CSV ingestion does.
    pub fn new(
        text: Option<&str>,
        rating: Option<u8>,
        date: impl Into<String>,
        bank: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            text: normalize_text(text),
            rating,
            date: date.into(),
            bank: bank.into(),
            source: source.into(),
        }
    }

    /// Returns the review text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Maps absent, blank and NaN-like values to `None`; keeps other text as-is.
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if MISSING_TEXT_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    {
        return None;
    }
    Some(raw.to_string())
}

/// Parses a rating cell. Accepts "4" and float exports like "4.0"; anything
/// outside 1..=5 is dropped.
pub fn parse_rating(raw: &str) -> Option<u8> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if (1.0..=5.0).contains(&rounded) {
        Some(rounded as u8)
    } else {
        None
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(normalize_text(raw.as_deref()))
}

fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_rating))
}
