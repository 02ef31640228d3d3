//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::TranslationError;

/// Translation direction between Russian and Kazakh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Russian to Kazakh
    #[serde(rename = "ru-kk")]
    RuKk,
    /// Kazakh to Russian
    #[serde(rename = "kk-ru")]
    KkRu,
}

impl Direction {
    /// Path segment used by the translation service
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::RuKk => "ru-kk",
            Direction::KkRu => "kk-ru",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ru-kk" => Ok(Direction::RuKk),
            "kk-ru" => Ok(Direction::KkRu),
            other => Err(TranslationError::InvalidDirection {
                value: other.to_string(),
            }),
        }
    }
}

/// Request body sent to the translation service
#[derive(Debug, Serialize)]
pub struct TranslateTextRequest<'a> {
    /// Text unit to translate
    pub text: &'a str,
}

/// Response body returned by the translation service
#[derive(Debug, Deserialize)]
pub struct TranslateTextResponse {
    /// Translated text; tolerated as absent
    #[serde(default)]
    pub translated_text: Option<String>,
}
