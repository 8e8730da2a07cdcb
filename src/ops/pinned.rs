//! Editing the hand-curated half of the index

use std::fmt;
use std::str::FromStr;

use super::Advisory;
use crate::error::{Error, Result};
use crate::record::ChangelogEntry;
use crate::store::Store;

/// Which pinned field to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinnedField {
    /// Approaches ruled out for good.
    DoNotTry,
    /// Ideas parked for later.
    Deferred,
    /// Known data quirks.
    DataWarnings,
    /// Features that must not be dropped.
    CriticalFeatures,
    /// Free-form notes.
    Notes,
}

impl fmt::Display for PinnedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DoNotTry => "do_not_try",
            Self::Deferred => "deferred",
            Self::DataWarnings => "data_warnings",
            Self::CriticalFeatures => "critical_features",
            Self::Notes => "notes",
        };
        f.write_str(s)
    }
}

impl FromStr for PinnedField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "do_not_try" => Ok(Self::DoNotTry),
            "deferred" => Ok(Self::Deferred),
            "data_warnings" => Ok(Self::DataWarnings),
            "critical_features" => Ok(Self::CriticalFeatures),
            "notes" => Ok(Self::Notes),
            other => Err(Error::Validation(format!(
                "unknown field {other:?}: use do_not_try, deferred, data_warnings, critical_features, notes"
            ))),
        }
    }
}

/// What to do with the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinnedAction {
    /// Append if not already present (for `notes`: append a new line).
    Add,
    /// Remove all matching items (not meaningful for `notes`).
    Remove,
    /// Replace the whole field.
    Set,
}

impl fmt::Display for PinnedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Set => "set",
        };
        f.write_str(s)
    }
}

impl FromStr for PinnedAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "set" => Ok(Self::Set),
            other => Err(Error::Validation(format!(
                "unknown action {other:?}: use add, remove, set"
            ))),
        }
    }
}

/// Apply one edit to the pinned index. Only the pinned half is touched; the
/// computed half is carried through as-is.
///
/// # Errors
///
/// Fails when the index document cannot be read or written.
pub fn update_pinned(
    store: &Store,
    field: PinnedField,
    action: PinnedAction,
    value: &str,
) -> Result<Advisory<()>> {
    let mut index = store.read_index()?;

    let summary = if field == PinnedField::Notes {
        "notes updated".to_string()
    } else {
        format!("{action} {field}: {value}")
    };

    let apply = |list: &mut Vec<String>| match action {
        PinnedAction::Add => {
            if !list.iter().any(|v| v == value) {
                list.push(value.to_string());
            }
        }
        PinnedAction::Remove => list.retain(|v| v != value),
        PinnedAction::Set => *list = vec![value.to_string()],
    };

    match field {
        PinnedField::Notes => {
            if action == PinnedAction::Set || index.pinned.notes.is_empty() {
                index.pinned.notes = value.to_string();
            } else {
                index.pinned.notes.push('\n');
                index.pinned.notes.push_str(value);
            }
        }
        PinnedField::DoNotTry => apply(&mut index.pinned.do_not_try),
        PinnedField::Deferred => apply(&mut index.pinned.deferred),
        PinnedField::DataWarnings => apply(&mut index.pinned.data_warnings),
        PinnedField::CriticalFeatures => apply(&mut index.pinned.critical_features),
    }

    store.write_index(&index)?;

    let mut advisory = Advisory::clean(());
    if let Err(e) =
        store.append_changelog(ChangelogEntry::new("pinned_updated").with_summary(summary))
    {
        advisory.warn("changelog append failed", &e);
    }
    Ok(advisory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Project;
    use tempfile::TempDir;

    fn init_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path());
        store.init(&Project::default()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_notes_append_and_set() {
        let (_dir, store) = init_store();

        update_pinned(&store, PinnedField::Notes, PinnedAction::Add, "first").unwrap();
        update_pinned(&store, PinnedField::Notes, PinnedAction::Add, "second").unwrap();
        assert_eq!(store.read_index().unwrap().pinned.notes, "first\nsecond");

        update_pinned(&store, PinnedField::Notes, PinnedAction::Set, "clean slate").unwrap();
        assert_eq!(store.read_index().unwrap().pinned.notes, "clean slate");
    }

    #[test]
    fn test_list_add_dedupes_and_remove() {
        let (_dir, store) = init_store();

        update_pinned(&store, PinnedField::DoNotTry, PinnedAction::Add, "leaky feature").unwrap();
        update_pinned(&store, PinnedField::DoNotTry, PinnedAction::Add, "leaky feature").unwrap();
        update_pinned(&store, PinnedField::DoNotTry, PinnedAction::Add, "oversampling").unwrap();
        let pinned = store.read_index().unwrap().pinned;
        assert_eq!(pinned.do_not_try, vec!["leaky feature", "oversampling"]);

        update_pinned(&store, PinnedField::DoNotTry, PinnedAction::Remove, "leaky feature")
            .unwrap();
        assert_eq!(store.read_index().unwrap().pinned.do_not_try, vec!["oversampling"]);
    }

    #[test]
    fn test_every_field_routes_without_touching_computed() {
        let (_dir, store) = init_store();

        for field in [
            PinnedField::Deferred,
            PinnedField::DataWarnings,
            PinnedField::CriticalFeatures,
        ] {
            update_pinned(&store, field, PinnedAction::Set, "entry").unwrap();
        }

        let index = store.read_index().unwrap();
        assert_eq!(index.pinned.deferred, vec!["entry"]);
        assert_eq!(index.pinned.data_warnings, vec!["entry"]);
        assert_eq!(index.pinned.critical_features, vec!["entry"]);
        assert_eq!(index.computed.total_experiments, 0);
    }

    #[test]
    fn test_field_parse() {
        assert_eq!("do_not_try".parse::<PinnedField>().unwrap(), PinnedField::DoNotTry);
        assert!("random".parse::<PinnedField>().is_err());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("set".parse::<PinnedAction>().unwrap(), PinnedAction::Set);
        assert!("clear".parse::<PinnedAction>().is_err());
    }
}
