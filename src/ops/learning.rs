//! Learning and graveyard operations

use super::Advisory;
use crate::error::Result;
use crate::index::{self, detect_conflicts, Conflict};
use crate::record::{ChangelogEntry, GraveyardEntry, Learning};
use crate::store::Store;

/// Result of adding a learning: the assigned ID plus any advisory conflicts
/// against existing graveyard/opposite-type entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedLearning {
    /// The assigned sequential ID.
    pub id: String,
    /// Advisory conflicts. The add goes through regardless; these are for
    /// the caller to surface, review, and resolve manually.
    pub conflicts: Vec<Conflict>,
}

/// Add a learning, reporting conflicts detected against the current
/// collections before the write.
///
/// # Errors
///
/// Fails on read/write failures of the learnings document.
pub fn add_learning(store: &Store, learning: Learning) -> Result<Advisory<AddedLearning>> {
    let learnings = store.read_learnings().unwrap_or_default();
    let graveyard = store.read_graveyard().unwrap_or_default();
    let conflicts = detect_conflicts(&learning, &learnings, &graveyard);

    let kind = learning.kind.to_string();
    let summary = learning.text.clone();
    let id = store.add_learning(learning)?;

    let mut advisory = Advisory::clean(());
    if let Err(e) = store.append_changelog(
        ChangelogEntry::new("learning_added")
            .with_id(id.clone())
            .with_kind(kind)
            .with_summary(summary),
    ) {
        advisory.warn("changelog append failed", &e);
    }
    if let Err(e) = index::update_learning_counts(store) {
        advisory.warn("learning counts update failed", &e);
    }

    Ok(Advisory {
        value: AddedLearning { id, conflicts },
        warnings: advisory.warnings,
    })
}

/// Record a failed approach in the graveyard.
///
/// # Errors
///
/// Fails on read/write failures of the graveyard document.
pub fn add_graveyard_entry(store: &Store, entry: GraveyardEntry) -> Result<Advisory<String>> {
    let summary = format!("{} — {}", entry.approach, entry.reason);
    let id = store.add_graveyard_entry(entry)?;

    let mut advisory = Advisory::clean(());
    if let Err(e) = store.append_changelog(
        ChangelogEntry::new("graveyard_added")
            .with_id(id.clone())
            .with_summary(summary),
    ) {
        advisory.warn("changelog append failed", &e);
    }
    if let Err(e) = index::update_learning_counts(store) {
        advisory.warn("learning counts update failed", &e);
    }

    Ok(Advisory {
        value: id,
        warnings: advisory.warnings,
    })
}

/// Delete a learning by ID and refresh the index counts.
///
/// # Errors
///
/// `Error::NotFound` when no learning carries `id`.
pub fn delete_learning(store: &Store, id: &str) -> Result<Advisory<()>> {
    store.delete_learning(id)?;
    finish_delete(store, "learning_deleted", id)
}

/// Delete a graveyard entry by ID and refresh the index counts.
///
/// # Errors
///
/// `Error::NotFound` when no entry carries `id`.
pub fn delete_graveyard_entry(store: &Store, id: &str) -> Result<Advisory<()>> {
    store.delete_graveyard_entry(id)?;
    finish_delete(store, "graveyard_deleted", id)
}

fn finish_delete(store: &Store, action: &str, id: &str) -> Result<Advisory<()>> {
    let mut advisory = Advisory::clean(());
    if let Err(e) = store.append_changelog(ChangelogEntry::new(action).with_id(id)) {
        advisory.warn("changelog append failed", &e);
    }
    if let Err(e) = index::update_learning_counts(store) {
        advisory.warn("learning counts update failed", &e);
    }
    Ok(advisory)
}
