use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub note_id: String,
    pub note_title: String,
    pub note_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    /// Server timestamp of the last change, as sent.
    pub last_update: String,
}

impl Note {
    /// `last_update` parsed as UTC, if the server sent something readable.
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_update)
    }
}

/// Body of `POST /notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub note_title: String,
    pub note_content: String,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            note_title: title.into(),
            note_content: content.into(),
        }
    }
}

/// Body of `PUT /notes/{id}`. Absent fields are left unchanged server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_content: Option<String>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.note_title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.note_content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.note_title.is_none() && self.note_content.is_none()
    }
}

/// RFC 3339, or a naive ISO timestamp taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
