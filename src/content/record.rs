/*!
 * Bilingual content records and display resolution.
 *
 * A record carries one document per language. The English variant lives in
 * the primary slot and always exists; the Tamil variant lives in the
 * secondary slot and may be missing entirely, or present for the title only.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::codec::deserialize;
use crate::document::model::Document;
use crate::language_utils::Language;

/// Publication status of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Being written
    #[default]
    Draft,
    /// Submitted for review
    PendingApproval,
    /// Accepted by a reviewer
    Approved,
    /// Sent back by a reviewer
    Rejected,
    /// Visible to readers
    Published,
}

impl ContentStatus {
    /// Whether the workflow allows moving from this status to `next`
    pub fn can_transition_to(&self, next: ContentStatus) -> bool {
        use ContentStatus::*;
        matches!(
            (self, next),
            (Draft, PendingApproval)
                | (PendingApproval, Approved)
                | (PendingApproval, Rejected)
                | (Approved, Published)
                | (Rejected, Draft)
                | (Published, Draft)
        )
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentStatus::Draft => write!(f, "draft"),
            ContentStatus::PendingApproval => write!(f, "pending_approval"),
            ContentStatus::Approved => write!(f, "approved"),
            ContentStatus::Rejected => write!(f, "rejected"),
            ContentStatus::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(ContentStatus::Draft),
            "pending_approval" => Ok(ContentStatus::PendingApproval),
            "approved" => Ok(ContentStatus::Approved),
            "rejected" => Ok(ContentStatus::Rejected),
            "published" => Ok(ContentStatus::Published),
            _ => Err(anyhow::anyhow!("Invalid content status: {}", s)),
        }
    }
}

/// Language slot of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// English title and document
    Primary,
    /// Tamil title and document
    Secondary,
}

impl Slot {
    pub fn language(&self) -> Language {
        match self {
            Slot::Primary => Language::English,
            Slot::Secondary => Language::Tamil,
        }
    }

    pub fn other(&self) -> Slot {
        match self {
            Slot::Primary => Slot::Secondary,
            Slot::Secondary => Slot::Primary,
        }
    }
}

impl From<Language> for Slot {
    fn from(language: Language) -> Self {
        match language {
            Language::English => Slot::Primary,
            Language::Tamil => Slot::Secondary,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Primary => write!(f, "primary"),
            Slot::Secondary => write!(f, "secondary"),
        }
    }
}

/// A stored piece of content. Documents are kept in serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub title: String,
    pub document: String,
    pub title_secondary: Option<String>,
    pub document_secondary: Option<String>,
    pub status: ContentStatus,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    /// Stored title of a slot
    pub fn title_for(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Primary => Some(self.title.as_str()),
            Slot::Secondary => self.title_secondary.as_deref(),
        }
    }

    /// Stored serialized document of a slot
    pub fn document_for(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Primary => Some(self.document.as_str()),
            Slot::Secondary => self.document_secondary.as_deref(),
        }
    }

    /// True when the Tamil document is present and non-blank
    pub fn has_secondary_document(&self) -> bool {
        non_blank(self.document_secondary.as_deref()).is_some()
    }

    /// Apply a partial update in place, as stores do on write
    pub fn apply(&mut self, update: &ContentUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(document) = &update.document {
            self.document = document.clone();
        }
        if let Some(title) = &update.title_secondary {
            self.title_secondary = Some(title.clone());
        }
        if let Some(document) = &update.document_secondary {
            self.document_secondary = Some(document.clone());
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

/// Fields for creating a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewContent {
    pub title: String,
    pub document: String,
    pub title_secondary: Option<String>,
    pub document_secondary: Option<String>,
    pub status: ContentStatus,
}

/// Partial update of a record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentUpdate {
    pub title: Option<String>,
    pub document: Option<String>,
    pub title_secondary: Option<String>,
    pub document_secondary: Option<String>,
    pub status: Option<ContentStatus>,
}

impl ContentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title of `slot`
    pub fn with_title(mut self, slot: Slot, title: impl Into<String>) -> Self {
        match slot {
            Slot::Primary => self.title = Some(title.into()),
            Slot::Secondary => self.title_secondary = Some(title.into()),
        }
        self
    }

    /// Set the serialized document of `slot`
    pub fn with_document(mut self, slot: Slot, serialized: impl Into<String>) -> Self {
        match slot {
            Slot::Primary => self.document = Some(serialized.into()),
            Slot::Secondary => self.document_secondary = Some(serialized.into()),
        }
        self
    }

    pub fn with_status(mut self, status: ContentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Localized strings shown when a language variant is missing
#[derive(Debug, Clone, Copy)]
struct Placeholders {
    title: &'static str,
    content: &'static str,
}

fn placeholders(language: Language) -> Placeholders {
    match language {
        Language::English => Placeholders {
            title: "Not available in English",
            content: "Content not available",
        },
        Language::Tamil => Placeholders {
            title: "தமிழில் கிடைக்கவில்லை",
            content: "உள்ளடக்கம் கிடைக்கவில்லை",
        },
    }
}

/// What a reader sees for one language of a record
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayContent {
    pub language: Language,

    /// Stored title, or the localized "not available" title
    pub title: String,

    /// Whether `title` is the stored title
    pub title_available: bool,

    /// Decoded document; `None` when the slot holds no content
    pub document: Option<Document>,

    /// Localized message to show instead of a missing document
    pub content_placeholder: Option<&'static str>,
}

impl DisplayContent {
    pub fn is_available(&self) -> bool {
        self.title_available && self.document.is_some()
    }
}

/// Resolve the title and document a reader should see for `language`.
///
/// Blank values count as absent. An absent document yields a placeholder
/// and is never handed to the deserializer.
pub fn resolve_display(record: &ContentRecord, language: Language) -> DisplayContent {
    let slot = Slot::from(language);
    let text = placeholders(language);

    let (title, title_available) = match non_blank(record.title_for(slot)) {
        Some(title) => (title.to_string(), true),
        None => (text.title.to_string(), false),
    };

    let document = non_blank(record.document_for(slot)).map(deserialize);
    let content_placeholder = document.is_none().then_some(text.content);

    DisplayContent {
        language,
        title,
        title_available,
        document,
        content_placeholder,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
