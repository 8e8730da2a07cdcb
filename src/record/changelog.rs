//! Append-only changelog document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit record for a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// When the mutation happened (UTC). Defaulted by the store on append.
    #[serde(rename = "ts", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// What happened: `exp_logged`, `exp_edited`, `exp_deleted`,
    /// `learning_added`, `learning_deleted`, `graveyard_added`,
    /// `graveyard_deleted`, `pinned_updated`.
    pub action: String,
    /// Relevant entity ID, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Sub-type, e.g. `proven` or `assumption` for learnings.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Human-readable one-liner.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
}

impl ChangelogEntry {
    /// Create an entry with no timestamp; the store fills it in on append.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            action: action.into(),
            id: String::new(),
            kind: String::new(),
            summary: String::new(),
        }
    }

    /// Attach an entity ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attach a sub-type.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Attach a summary line.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// On-disk changelog document, capped at a fixed number of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChangelogFile {
    /// Retained entries, oldest first.
    #[serde(default)]
    pub entries: Vec<ChangelogEntry>,
}
