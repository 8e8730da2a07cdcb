//! Learnings and the graveyard of failed approaches

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How confident we are in a learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningType {
    /// Backed by experiment evidence.
    Proven,
    /// Believed but not yet verified.
    Assumption,
}

impl fmt::Display for LearningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proven => f.write_str("proven"),
            Self::Assumption => f.write_str("assumption"),
        }
    }
}

impl FromStr for LearningType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proven" => Ok(Self::Proven),
            "assumption" => Ok(Self::Assumption),
            other => Err(Error::Validation(format!(
                "invalid type {other:?}: must be proven|assumption"
            ))),
        }
    }
}

/// One free-text finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learning {
    /// Sequential ID, e.g. `learn_001`.
    #[serde(default)]
    pub id: String,
    /// When the learning was recorded (UTC).
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Proven or assumption.
    pub kind: LearningType,
    /// The learning itself.
    pub text: String,
    /// Experiment ID → observation backing it.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub evidence: HashMap<String, String>,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Learning {
    /// Create a learning with no ID yet; the store assigns one on add.
    #[must_use]
    pub fn new(kind: LearningType, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            timestamp: Utc::now(),
            kind,
            text: text.into(),
            evidence: HashMap::new(),
            tags: Vec::new(),
        }
    }
}

/// A failed approach and why it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraveyardEntry {
    /// Sequential ID, e.g. `grave_001`.
    #[serde(default)]
    pub id: String,
    /// When the failure was recorded (UTC).
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// What was tried.
    pub approach: String,
    /// Why it did not work.
    pub reason: String,
    /// Experiment that demonstrated the failure, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub experiment_id: String,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl GraveyardEntry {
    /// Create an entry with no ID yet; the store assigns one on add.
    #[must_use]
    pub fn new(approach: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            timestamp: Utc::now(),
            approach: approach.into(),
            reason: reason.into(),
            experiment_id: String::new(),
            tags: Vec::new(),
        }
    }
}

/// On-disk learnings document: two ordered lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LearningsFile {
    /// Proven findings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proven: Vec<Learning>,
    /// Unverified assumptions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<Learning>,
}

/// On-disk graveyard document: one ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraveyardFile {
    /// All recorded failures, oldest first.
    #[serde(default)]
    pub entries: Vec<GraveyardEntry>,
}
