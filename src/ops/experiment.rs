//! Experiment lifecycle operations: log, edit, delete

use chrono::Utc;
use tracing::debug;

use super::Advisory;
use crate::error::{Error, Result};
use crate::format::experiment_one_liner;
use crate::index;
use crate::record::{ChangelogEntry, Experiment, ExperimentStatus, MetricResult};
use crate::store::Store;

/// Input for logging a new experiment. The ID, timestamp, metric name, and
/// baseline/delta are filled in by [`log_experiment`].
#[derive(Debug, Clone, Default)]
pub struct ExperimentDraft {
    /// Model family label.
    pub base_model: String,
    /// Parent experiment IDs; each must exist.
    pub parents: Vec<String>,
    /// Observed value of the project metric.
    pub metric_value: f64,
    /// Outcome status.
    pub status: Option<ExperimentStatus>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Free-form notes.
    pub notes: String,
}

/// Fields an edit is allowed to touch. Everything else on an experiment is
/// immutable after logging.
#[derive(Debug, Clone, Default)]
pub struct ExperimentEdit {
    /// Replacement notes.
    pub notes: Option<String>,
    /// Replacement status.
    pub status: Option<ExperimentStatus>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
}

/// Log a new experiment: allocate an ID, resolve the baseline, write the
/// record, then fold it into the index and changelog best-effort.
///
/// The baseline is the first parent's metric value when parents are given,
/// otherwise the current best metric from the index; either source failing to
/// resolve is a warning, not an error.
///
/// # Errors
///
/// `Error::Validation` when no status was supplied, `Error::NotFound` when a
/// parent does not exist, plus read/write failures on the primary record.
pub fn log_experiment(store: &Store, draft: ExperimentDraft) -> Result<Advisory<Experiment>> {
    let status = draft
        .status
        .ok_or_else(|| Error::Validation(format!("missing status: must be {}", ExperimentStatus::VALID)))?;

    let project = store.read_project()?;

    for pid in &draft.parents {
        store
            .read_experiment(pid)
            .map_err(|_| Error::not_found("parent experiment", pid.clone()))?;
    }

    let id = store.next_experiment_id()?;
    let mut exp = Experiment::new(
        id,
        MetricResult {
            name: project.metric.name.clone(),
            value: draft.metric_value,
            baseline: None,
            delta: None,
        },
        status,
    );
    exp.timestamp = Utc::now();
    exp.base_model = draft.base_model;
    exp.parents = draft.parents;
    exp.tags = draft.tags;
    exp.notes = draft.notes;

    let mut advisory = Advisory::clean(());

    // baseline from first parent, else from the recorded best
    if let Some(first_parent) = exp.parents.first().cloned() {
        match store.read_experiment(&first_parent) {
            Ok(parent) => {
                exp.metric.baseline = Some(parent.metric.value);
                exp.metric.delta = Some(exp.metric.value - parent.metric.value);
            }
            Err(e) => advisory.warn("could not compute baseline from parent", &e),
        }
    } else {
        match store.read_index() {
            Ok(index) => {
                if let Some(best) = index.computed.best_metric {
                    exp.metric.baseline = Some(best.value);
                    exp.metric.delta = Some(exp.metric.value - best.value);
                }
            }
            Err(e) => advisory.warn("could not compute baseline from index", &e),
        }
    }

    store.write_experiment(&exp)?;
    debug!(id = %exp.id, value = exp.metric.value, "logged experiment");

    if let Err(e) = index::update_incremental(store, &exp) {
        advisory.warn("index update failed", &e);
    }

    if let Err(e) = store.append_changelog(
        ChangelogEntry::new("exp_logged")
            .with_id(exp.id.clone())
            .with_summary(experiment_one_liner(&exp)),
    ) {
        advisory.warn("changelog append failed", &e);
    }

    Ok(Advisory {
        value: exp,
        warnings: advisory.warnings,
    })
}

/// Edit an experiment's notes, status, or tags, then rebuild the index.
///
/// # Errors
///
/// `Error::Validation` when the edit is empty, `Error::NotFound` when the
/// experiment does not exist, plus write failures on the primary record.
pub fn edit_experiment(store: &Store, id: &str, edit: ExperimentEdit) -> Result<Advisory<Experiment>> {
    if edit.notes.is_none() && edit.status.is_none() && edit.tags.is_none() {
        return Err(Error::Validation(
            "nothing to edit: supply notes, status, or tags".to_string(),
        ));
    }

    let mut exp = store.read_experiment(id)?;
    if let Some(notes) = edit.notes {
        exp.notes = notes;
    }
    if let Some(status) = edit.status {
        exp.status = status;
    }
    if let Some(tags) = edit.tags {
        exp.tags = tags;
    }

    store.write_experiment(&exp)?;

    let mut advisory = Advisory::clean(());
    if let Err(e) = index::rebuild(store) {
        advisory.warn("index rebuild failed", &e);
    }
    if let Err(e) = store.append_changelog(
        ChangelogEntry::new("exp_edited")
            .with_id(id)
            .with_summary(format!("edited experiment {id}")),
    ) {
        advisory.warn("changelog append failed", &e);
    }

    Ok(Advisory {
        value: exp,
        warnings: advisory.warnings,
    })
}

/// Delete an experiment that nothing references, then rebuild the index.
///
/// # Errors
///
/// `Error::ReferencedAsParent` when other experiments still list it as a
/// parent (the store is left unchanged), `Error::NotFound` when it does not
/// exist.
pub fn delete_experiment(store: &Store, id: &str) -> Result<Advisory<()>> {
    store.delete_experiment(id)?;

    let mut advisory = Advisory::clean(());
    if let Err(e) = store.append_changelog(
        ChangelogEntry::new("exp_deleted")
            .with_id(id)
            .with_summary(format!("deleted experiment {id}")),
    ) {
        advisory.warn("changelog append failed", &e);
    }
    if let Err(e) = index::rebuild(store) {
        advisory.warn("index rebuild failed", &e);
    }

    Ok(advisory)
}
