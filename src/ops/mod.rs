//! High-level mutating operations
//!
//! Each operation runs the same shape of control flow: validate, write the
//! primary entity, then update the derived index and append a changelog
//! entry. The last two steps are best-effort; their failures are returned as
//! advisory [`Advisory::warnings`] next to the primary outcome and never roll
//! back or fail the write that already happened.

mod experiment;
mod learning;
mod pinned;

pub use experiment::{delete_experiment, edit_experiment, log_experiment, ExperimentDraft,
    ExperimentEdit};
pub use learning::{
    add_graveyard_entry, add_learning, delete_graveyard_entry, delete_learning, AddedLearning,
};
pub use pinned::{update_pinned, PinnedAction, PinnedField};

/// A primary outcome plus accumulated advisory warnings.
///
/// Callers can always distinguish "the operation failed" (an `Err` from the
/// operation) from "the operation succeeded with degraded bookkeeping"
/// (an `Ok` whose warnings are non-empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory<T> {
    /// The primary result.
    pub value: T,
    /// Side-effect failures downgraded to warnings.
    pub warnings: Vec<String>,
}

impl<T> Advisory<T> {
    /// Wrap a value with no warnings.
    #[must_use]
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Record the error of a failed best-effort step.
    pub fn warn(&mut self, context: &str, err: &crate::error::Error) {
        self.warnings.push(format!("{context}: {err}"));
    }
}
