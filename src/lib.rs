//! # Labtrail: File-Backed Experiment Knowledge Base
//!
//! Labtrail keeps an ML project's experiment history, validated learnings,
//! and failed approaches in plain YAML files under a `.labtrail/` directory,
//! and maintains a derived index over them so an agent (or a human) can ask
//! "what's the best run, and how did we get there?" without rescanning every
//! record.
//!
//! ## Layout
//!
//! - [`record`]: the YAML data model (experiments, learnings, graveyard,
//!   project config, index, changelog)
//! - [`store`]: atomic file persistence and sequential ID allocation
//! - [`index`]: best-experiment selection, lineage chains, conflict
//!   detection, and incremental index maintenance
//! - [`ops`]: mutation workflows (log, edit, delete) that keep the index
//!   and changelog in step, downgrading bookkeeping failures to warnings
//! - [`tools`]: a name-dispatched call surface for agent integrations
//! - [`format`]: depth-based output shaping and token estimation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use labtrail::ops::{self, ExperimentDraft};
//! use labtrail::record::ExperimentStatus;
//! use labtrail::store::Store;
//!
//! let store = Store::new(".");
//! let draft = ExperimentDraft {
//!     base_model: "lightgbm".into(),
//!     metric_value: 0.843,
//!     status: Some(ExperimentStatus::Improved),
//!     ..ExperimentDraft::default()
//! };
//! let logged = ops::log_experiment(&store, draft)?;
//! println!("logged {}", logged.value.id);
//! # Ok::<(), labtrail::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod format;
pub mod index;
pub mod ops;
pub mod record;
pub mod store;
pub mod tags;
pub mod tools;

pub use error::{Error, Result};
