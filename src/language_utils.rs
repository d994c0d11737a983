use anyhow::{Result, anyhow};
use isolang::Language as IsoLanguage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Language utilities for the bilingual content pipeline.
//
// Content carries exactly two language variants. English lives in the
// primary slot of a record and Tamil in the secondary slot.

/// Any character from the Tamil Unicode block (U+0B80..=U+0BFF)
static TAMIL_CHAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{0B80}-\x{0BFF}]").expect("valid tamil block regex"));

/// A language the portal publishes content in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Tamil,
}

impl Language {
    /// ISO 639-1 code sent to the translation capability
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Tamil => "ta",
        }
    }

    /// The other language of the pair
    pub fn other(&self) -> Self {
        match self {
            Self::English => Self::Tamil,
            Self::Tamil => Self::English,
        }
    }

    /// English name, resolved through the ISO tables
    pub fn english_name(&self) -> &'static str {
        IsoLanguage::from_639_1(self.code())
            .map(|lang| lang.to_name())
            .unwrap_or(match self {
                Self::English => "English",
                Self::Tamil => "Tamil",
            })
    }

    /// Name of the language written in itself
    pub fn native_name(&self) -> &'static str {
        IsoLanguage::from_639_1(self.code())
            .and_then(|lang| lang.to_autonym())
            .unwrap_or(match self {
                Self::English => "English",
                Self::Tamil => "தமிழ்",
            })
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "english" => return Ok(Self::English),
            "tamil" => return Ok(Self::Tamil),
            _ => {}
        }

        let part1 = normalize_to_part1(&normalized)?;
        match part1.as_str() {
            "en" => Ok(Self::English),
            "ta" => Ok(Self::Tamil),
            _ => Err(anyhow!("Unsupported content language: {}", s)),
        }
    }
}

/// Normalize an ISO 639-1 or ISO 639-3 code to its ISO 639-1 form
pub fn normalize_to_part1(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    let language = match normalized_code.len() {
        2 => IsoLanguage::from_639_1(&normalized_code),
        3 => IsoLanguage::from_639_3(&normalized_code),
        _ => None,
    };

    language
        .and_then(|lang| lang.to_639_1())
        .map(|part1| part1.to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Returns true when the text contains any Tamil character
pub fn contains_tamil(text: &str) -> bool {
    TAMIL_CHAR_REGEX.is_match(text)
}

/// Detect the language of a piece of content.
///
/// Any Tamil character makes the content Tamil; everything else is English.
pub fn detect_language(text: &str) -> Language {
    if contains_tamil(text) {
        Language::Tamil
    } else {
        Language::English
    }
}
