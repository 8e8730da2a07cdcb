//! Rebuild and incremental maintenance of the persisted index

use chrono::Utc;
use tracing::{debug, warn};

use super::compute::{best_chain, compute};
use crate::error::{Error, Result};
use crate::record::{Experiment, ExperimentStatus, Index};
use crate::store::Store;

/// Rebuild the computed half of the index from the full record collections
/// and persist it.
///
/// The existing index document is read first so the pinned half carries
/// through unchanged; an absent document starts from empty pins, but an
/// unreadable one is a hard failure, since overwriting it could destroy
/// curated data.
///
/// # Errors
///
/// Fails on unreadable records, an invalid metric direction, or a write
/// failure. On failure the prior document is left untouched.
pub fn rebuild(store: &Store) -> Result<Index> {
    let mut index = match store.read_index() {
        Ok(index) => index,
        Err(e) if e.is_file_missing() => Index::default(),
        Err(e) => {
            return Err(Error::Other(format!(
                "reading existing index (pinned data at risk): {e}"
            )))
        }
    };

    let project = store.read_project()?;
    let direction = project.metric.direction()?;

    let exps = store.list_experiments()?;
    let learnings = store.read_learnings()?;
    let graveyard = store.read_graveyard()?;

    index.computed = compute(&exps, &learnings, &graveyard, direction);
    store.write_index(&index)?;

    debug!(
        total = index.computed.total_experiments,
        best = %index.computed.best_experiment,
        "index rebuilt"
    );
    Ok(index)
}

/// Fold a single freshly written experiment into the persisted index without
/// rescanning every experiment.
///
/// Counts and the tag union update in place. Whether the new experiment takes
/// the best title is decided against the recorded best using the same strict
/// comparison as a full rebuild (a failed experiment never can); only when it
/// wins is the chain recomputed, which necessarily scans the full set.
///
/// An unreadable or missing index degrades to a full [`rebuild`]. An
/// unreadable project config is a hard failure: the comparison cannot be made
/// without the metric direction.
///
/// # Errors
///
/// Fails on an unreadable project config, invalid metric direction, or write
/// failure.
pub fn update_incremental(store: &Store, new_exp: &Experiment) -> Result<Index> {
    let mut index = match store.read_index() {
        Ok(index) => index,
        Err(e) => {
            warn!(error = %e, "index unreadable, falling back to full rebuild");
            return rebuild(store);
        }
    };

    let project = store.read_project()?;
    let direction = project.metric.direction()?;

    let computed = &mut index.computed;
    computed.last_updated = Some(Utc::now());
    computed.total_experiments += 1;
    *computed.status_counts.entry(new_exp.status).or_insert(0) += 1;

    for tag in &new_exp.tags {
        if !computed.all_tags.contains(tag) {
            computed.all_tags.push(tag.clone());
        }
    }

    let is_better = new_exp.status != ExperimentStatus::Failed
        && computed
            .best_metric
            .as_ref()
            .map_or(true, |best| direction.beats(new_exp.metric.value, best.value));

    if is_better {
        computed.best_experiment = new_exp.id.clone();
        computed.best_metric = Some(new_exp.metric.clone());

        match store.list_experiments() {
            Ok(exps) => computed.experiment_chain = best_chain(&exps, new_exp, direction),
            Err(e) => warn!(error = %e, "chain recomputation skipped"),
        }
    }

    store.write_index(&index)?;
    Ok(index)
}

/// Refresh only the proven/assumption/graveyard counts in the index.
///
/// # Errors
///
/// Fails when the index, learnings, or graveyard documents cannot be read,
/// or on write failure.
pub fn update_learning_counts(store: &Store) -> Result<()> {
    let mut index = store.read_index()?;

    let learnings = store.read_learnings()?;
    let graveyard = store.read_graveyard()?;

    index.computed.proven_count = learnings.proven.len();
    index.computed.assumption_count = learnings.assumptions.len();
    index.computed.graveyard_count = graveyard.entries.len();

    store.write_index(&index)
}
