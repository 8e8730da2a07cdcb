//! Record schema for the knowledge base
//!
//! Everything persisted on disk round-trips through these types: experiments
//! form a parent-referenced DAG, learnings and graveyard entries are
//! append-mostly lists, the project config names the metric being optimized,
//! and the index document carries a derived (`computed`) and a hand-curated
//! (`pinned`) half.
//!
//! Optional fields use `skip_serializing_if` so an unmodified document
//! re-encodes without spurious empty keys.

mod changelog;
mod depth;
mod experiment;
mod index;
mod learning;
mod project;

pub use changelog::{ChangelogEntry, ChangelogFile};
pub use depth::Depth;
pub use experiment::{Change, Environment, Experiment, ExperimentStatus, MetricResult, Reasoning};
pub use index::{ComputedIndex, Index, PinnedIndex};
pub use learning::{GraveyardEntry, GraveyardFile, Learning, LearningType, LearningsFile};
pub use project::{MetricDef, MetricDirection, Project};
