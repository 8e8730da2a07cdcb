//! Full recomputation of the derived index

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;

use crate::record::{
    ComputedIndex, Experiment, ExperimentStatus, GraveyardFile, LearningsFile, MetricDirection,
};

/// Rebuild the computed index from the full record collections.
///
/// Experiments are expected in ID-ascending order (the store lists them that
/// way); the tie-break below depends on it.
#[must_use]
pub fn compute(
    exps: &[Experiment],
    learnings: &LearningsFile,
    graveyard: &GraveyardFile,
    direction: MetricDirection,
) -> ComputedIndex {
    let mut ci = ComputedIndex {
        last_updated: Some(Utc::now()),
        total_experiments: exps.len(),
        proven_count: learnings.proven.len(),
        assumption_count: learnings.assumptions.len(),
        graveyard_count: graveyard.entries.len(),
        ..ComputedIndex::default()
    };

    if exps.is_empty() {
        return ci;
    }

    let mut tags = BTreeSet::new();
    for exp in exps {
        *ci.status_counts.entry(exp.status).or_insert(0) += 1;
        for tag in &exp.tags {
            tags.insert(tag.clone());
        }
    }
    ci.all_tags = tags.into_iter().collect();

    if let Some(best) = find_best(exps, direction) {
        ci.best_experiment = best.id.clone();
        ci.best_metric = Some(best.metric.clone());
        ci.experiment_chain = best_chain(exps, best, direction);
    }

    ci
}

/// Pick the best non-failed experiment.
///
/// Strict comparison in the metric direction; on a tie the earlier-seen
/// experiment keeps the title (first-seen wins).
#[must_use]
pub fn find_best(exps: &[Experiment], direction: MetricDirection) -> Option<&Experiment> {
    let mut best: Option<&Experiment> = None;
    for exp in exps {
        if exp.status == ExperimentStatus::Failed {
            continue;
        }
        match best {
            None => best = Some(exp),
            Some(b) if direction.beats(exp.metric.value, b.metric.value) => best = Some(exp),
            Some(_) => {}
        }
    }
    best
}

/// Walk backwards from `best` through parent references, taking the
/// best-metric unvisited parent at each step, then reverse so the chain reads
/// root→best.
///
/// The visited set guarantees termination even when the parent references
/// contain a cycle; a cycle is a data-integrity violation this walk tolerates
/// rather than crashes on. Parents pointing at missing experiments are
/// skipped.
#[must_use]
pub fn best_chain(exps: &[Experiment], best: &Experiment, direction: MetricDirection) -> Vec<String> {
    let by_id: HashMap<&str, &Experiment> =
        exps.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = best;

    loop {
        chain.push(current.id.clone());
        visited.insert(current.id.as_str());

        if current.parents.is_empty() {
            break;
        }

        let mut next: Option<&Experiment> = None;
        for pid in &current.parents {
            if visited.contains(pid.as_str()) {
                continue;
            }
            if let Some(parent) = by_id.get(pid.as_str()) {
                match next {
                    None => next = Some(parent),
                    Some(n) if direction.beats(parent.metric.value, n.metric.value) => {
                        next = Some(parent);
                    }
                    Some(_) => {}
                }
            }
        }

        match next {
            Some(parent) => current = parent,
            None => break,
        }
    }

    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricResult;

    fn exp(id: &str, value: f64, status: ExperimentStatus, parents: &[&str]) -> Experiment {
        let mut e = Experiment::new(
            id,
            MetricResult {
                name: "auc".to_string(),
                value,
                baseline: None,
                delta: None,
            },
            status,
        );
        e.parents = parents.iter().map(|&p| p.to_string()).collect();
        e
    }

    #[test]
    fn test_find_best_skips_failed() {
        let exps = vec![
            exp("exp_001", 0.99, ExperimentStatus::Failed, &[]),
            exp("exp_002", 0.70, ExperimentStatus::Improved, &[]),
        ];
        let best = find_best(&exps, MetricDirection::HigherIsBetter).unwrap();
        assert_eq!(best.id, "exp_002");
    }

    #[test]
    fn test_find_best_tie_keeps_first_seen() {
        let exps = vec![
            exp("exp_001", 0.80, ExperimentStatus::Neutral, &[]),
            exp("exp_002", 0.80, ExperimentStatus::Improved, &[]),
        ];
        let best = find_best(&exps, MetricDirection::HigherIsBetter).unwrap();
        assert_eq!(best.id, "exp_001");
    }

    #[test]
    fn test_find_best_all_failed() {
        let exps = vec![exp("exp_001", 0.9, ExperimentStatus::Failed, &[])];
        assert!(find_best(&exps, MetricDirection::HigherIsBetter).is_none());
    }

    #[test]
    fn test_chain_survives_cycle() {
        let exps = vec![
            exp("exp_001", 0.5, ExperimentStatus::Neutral, &["exp_002"]),
            exp("exp_002", 0.6, ExperimentStatus::Improved, &["exp_001"]),
        ];
        let chain = best_chain(&exps, &exps[1], MetricDirection::HigherIsBetter);
        assert_eq!(chain, vec!["exp_001", "exp_002"]);
    }

    #[test]
    fn test_chain_skips_missing_parent() {
        let exps = vec![exp("exp_002", 0.6, ExperimentStatus::Improved, &["exp_404"])];
        let chain = best_chain(&exps, &exps[0], MetricDirection::HigherIsBetter);
        assert_eq!(chain, vec!["exp_002"]);
    }

    #[test]
    fn test_compute_empty_set() {
        let ci = compute(
            &[],
            &LearningsFile::default(),
            &GraveyardFile::default(),
            MetricDirection::HigherIsBetter,
        );
        assert_eq!(ci.total_experiments, 0);
        assert!(ci.best_experiment.is_empty());
        assert!(ci.best_metric.is_none());
        assert!(ci.experiment_chain.is_empty());
    }

    #[test]
    fn test_compute_tags_sorted_unique() {
        let mut a = exp("exp_001", 0.5, ExperimentStatus::Neutral, &[]);
        a.tags = vec!["zeta".to_string(), "alpha".to_string()];
        let mut b = exp("exp_002", 0.6, ExperimentStatus::Improved, &[]);
        b.tags = vec!["alpha".to_string(), "mid".to_string()];

        let ci = compute(
            &[a, b],
            &LearningsFile::default(),
            &GraveyardFile::default(),
            MetricDirection::HigherIsBetter,
        );
        assert_eq!(ci.all_tags, vec!["alpha", "mid", "zeta"]);
    }
}
