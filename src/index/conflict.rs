//! Advisory conflict detection for new learnings
//!
//! A heuristic, not a proof of semantic conflict: it may over- or under-flag
//! and never blocks the add. Tag comparison is case-insensitive set
//! membership; text comparison lower-cases, splits on whitespace, keeps
//! tokens longer than 3 characters, and looks for at least 2 shared tokens.

use std::collections::HashSet;

use crate::record::{GraveyardFile, Learning, LearningType, LearningsFile};

/// One advisory conflict between a candidate learning and an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// What the candidate collides with: `graveyard`, `assumption`, or
    /// `proven learning`.
    pub conflicts_with: &'static str,
    /// ID and text of the conflicting entry.
    pub conflicting_entry: String,
}

/// Check a candidate learning against the graveyard and the opposite-type
/// learning list. Same-type entries are never cross-checked.
#[must_use]
pub fn detect_conflicts(
    candidate: &Learning,
    learnings: &LearningsFile,
    graveyard: &GraveyardFile,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    let tags = lower_set(&candidate.tags);
    let words = word_set(&candidate.text);

    for entry in &graveyard.entries {
        let entry_tags = lower_set(&entry.tags);
        let entry_words = word_set(&format!("{} {}", entry.approach, entry.reason));

        if overlaps(&tags, &entry_tags) || shared_words(&words, &entry_words) >= 2 {
            conflicts.push(Conflict {
                conflicts_with: "graveyard",
                conflicting_entry: format!("{}: {}", entry.id, entry.approach),
            });
        }
    }

    let (others, label) = match candidate.kind {
        LearningType::Proven => (&learnings.assumptions, "assumption"),
        LearningType::Assumption => (&learnings.proven, "proven learning"),
    };
    for other in others {
        let other_tags = lower_set(&other.tags);
        let other_words = word_set(&other.text);

        if overlaps(&tags, &other_tags) || shared_words(&words, &other_words) >= 2 {
            conflicts.push(Conflict {
                conflicts_with: label,
                conflicting_entry: format!("{}: {}", other.id, other.text),
            });
        }
    }

    conflicts
}

fn lower_set(items: &[String]) -> HashSet<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .map(str::to_string)
        .collect()
}

fn overlaps(a: &HashSet<String>, b: &HashSet<String>) -> bool {
    a.iter().any(|item| b.contains(item))
}

fn shared_words(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    a.intersection(b).count()
}
