//! Theme catalog: the ordered list of review topics with per-language
//! keyword sets.
//!
//! Declaration order matters, it breaks ties when two themes score the same.

use super::language::LanguageTag;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Theme reported when no keyword matched.
pub const OTHER_THEME: &str = "Other";
/// Theme reported when extraction itself failed.
pub const ERROR_THEME: &str = "Error";

const BUILTIN_THEMES: &[(&str, &[&str], &[&str])] = &[
    (
        "App Performance",
        &["slow", "fast", "crash", "lag", "freeze", "speed", "performance", "working", "not working"],
        &["ዘግይቷል", "ፈጣን", "ፕሮግራሙ", "ስልክ", "መተግበሪያ", "ፈረሰ", "ተቋርጧል", "ስራ", "አይሰራም"],
    ),
    (
        "User Interface",
        &["ui", "design", "layout", "interface", "button", "screen", "navigate", "look", "appearance"],
        &["መልክ", "ዲዛይን", "ማያሽን", "መስተጋብር", "አማራጭ", "ማየት", "ቀላል", "አስቸጋሪ"],
    ),
    (
        "Transaction Issues",
        &["transfer", "transaction", "failed", "error", "stuck", "decline", "send money", "receive"],
        &["ገንዘብ", "መላላክ", "ገቢ", "ወጪ", "ባንክ", "መላላፊያ", "አልሰራም", "ችግር"],
    ),
    (
        "Customer Support",
        &["support", "service", "help", "response", "contact", "assistance", "call", "email"],
        &["አገልግሎት", "አስተዳደር", "ሰራተኞች", "እርዳታ", "መልስ", "ደውለው ሂዱ", "አገናኝ", "ድጋፍ"],
    ),
    (
        "Fees & Charges",
        &["fee", "charge", "cost", "money", "payment", "expensive", "cheap", "price"],
        &["ክፍያ", "ቀሪ ሒሳብ", "ተቀናሽ", "ወጪ", "ገንዘብ", "ቀንሷል", "ጨምሯል", "ዋጋ"],
    ),
];

/// Keyword sets of one theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSets {
    pub en: Vec<String>,
    #[serde(default)]
    pub am: Vec<String>,
}

/// One topic of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDefinition {
    pub name: String,
    pub keywords: KeywordSets,
}

impl ThemeDefinition {
    /// Keywords to score `language` with. Languages other than en/am use the
    /// English set.
    pub fn keywords_for(&self, language: LanguageTag) -> &[String] {
        match language {
            LanguageTag::Am => &self.keywords.am,
            LanguageTag::En | LanguageTag::Other | LanguageTag::Unknown => &self.keywords.en,
        }
    }
}

/// Immutable, validated, ordered theme catalog.
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: Vec<ThemeDefinition>,
}

impl ThemeCatalog {
    /// The catalog of bank app review topics.
    pub fn builtin() -> Self {
        let themes = BUILTIN_THEMES
            .iter()
            .map(|(name, en, am)| ThemeDefinition {
                name: name.to_string(),
                keywords: KeywordSets {
                    en: en.iter().map(|k| k.to_string()).collect(),
                    am: am.iter().map(|k| k.to_string()).collect(),
                },
            })
            .collect();
        Self { themes }
    }

    /// Validates and normalizes theme definitions, keeping their order.
    ///
    /// Keywords are lower-cased and de-duplicated within each set so every
    /// keyword counts at most once.
    pub fn from_definitions(definitions: Vec<ThemeDefinition>) -> Result<Self, AppError> {
        if definitions.is_empty() {
            return Err(AppError::Validation("theme catalog is empty".to_string()));
        }

        let mut names = HashSet::new();
        let mut themes = Vec::with_capacity(definitions.len());

        for definition in definitions {
            let name = definition.name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation("theme name is blank".to_string()));
            }
            if name == OTHER_THEME || name == ERROR_THEME {
                return Err(AppError::Validation(format!(
                    "theme name '{}' is reserved",
                    name
                )));
            }
            if !names.insert(name.clone()) {
                return Err(AppError::Validation(format!("duplicate theme '{}'", name)));
            }

            let en = normalize_keywords(&definition.keywords.en);
            if en.is_empty() {
                return Err(AppError::Validation(format!(
                    "theme '{}' has no English keywords",
                    name
                )));
            }
            let am = normalize_keywords(&definition.keywords.am);

            themes.push(ThemeDefinition {
                name,
                keywords: KeywordSets { en, am },
            });
        }

        Ok(Self { themes })
    }

    /// Parses a JSON array of theme definitions.
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let definitions: Vec<ThemeDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    /// Loads a JSON catalog file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        info!("Loaded {} themes from {:?}", catalog.themes.len(), path);
        Ok(catalog)
    }

    /// Themes in declaration order.
    pub fn themes(&self) -> &[ThemeDefinition] {
        &self.themes
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}
