//! Derived index maintenance
//!
//! The computed half of the index document is a pure function of the record
//! collections: [`compute`] rebuilds it from scratch, [`update_incremental`]
//! folds a single new experiment into it without a full rescan, and
//! [`update_learning_counts`] refreshes only the three count fields.
//! [`detect_conflicts`] is the advisory cross-checker for new learnings.
//!
//! Nothing here partially writes: either a full computed section is produced
//! and persisted, or the prior document is left untouched and the error is
//! surfaced to the caller.

mod compute;
mod conflict;
mod maintain;

pub use compute::{best_chain, compute, find_best};
pub use conflict::{detect_conflicts, Conflict};
pub use maintain::{rebuild, update_incremental, update_learning_counts};
