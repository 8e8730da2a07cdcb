//! Index document: derived summary plus hand-curated pins
//!
//! The two halves are deliberately separate types. `ComputedIndex` is a pure
//! function of the record collections and may be thrown away and rebuilt at
//! any time; `PinnedIndex` is hand-authored and must survive every rebuild
//! untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::experiment::{ExperimentStatus, MetricResult};

/// Top-level index document with its two sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Index {
    /// Derived summary, overwritten by the index engine.
    #[serde(default)]
    pub computed: ComputedIndex,
    /// Curated lists, only ever edited explicitly.
    #[serde(default)]
    pub pinned: PinnedIndex,
}

/// Derived summary over all experiments, learnings, and graveyard entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComputedIndex {
    /// When the summary was last recomputed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Number of experiments on disk.
    #[serde(default)]
    pub total_experiments: usize,
    /// ID of the best non-failed experiment, or empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub best_experiment: String,
    /// Copy of the best experiment's metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_metric: Option<MetricResult>,
    /// Root→best walk through the parent DAG.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experiment_chain: Vec<String>,
    /// Sorted union of all experiment tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_tags: Vec<String>,
    /// Status → number of experiments with that status.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub status_counts: BTreeMap<ExperimentStatus, usize>,
    /// Number of proven learnings.
    #[serde(default)]
    pub proven_count: usize,
    /// Number of assumptions.
    #[serde(default)]
    pub assumption_count: usize,
    /// Number of graveyard entries.
    #[serde(default)]
    pub graveyard_count: usize,
}

/// Hand-curated lists that persist independently of any recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PinnedIndex {
    /// Approaches ruled out for good.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub do_not_try: Vec<String>,
    /// Ideas parked for later.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deferred: Vec<String>,
    /// Known data quirks to keep in mind.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_warnings: Vec<String>,
    /// Features that must not be dropped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub critical_features: Vec<String>,
    /// Free-form curated notes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index_round_trip() {
        let idx = Index::default();
        let yaml = serde_yaml::to_string(&idx).unwrap();
        let back: Index = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, idx);
    }

    #[test]
    fn test_status_counts_serialize_as_strings() {
        let mut computed = ComputedIndex::default();
        computed
            .status_counts
            .insert(ExperimentStatus::Improved, 2);
        let yaml = serde_yaml::to_string(&computed).unwrap();
        assert!(yaml.contains("improved: 2"));
    }
}
