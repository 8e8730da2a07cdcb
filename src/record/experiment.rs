//! Experiment record - one node in the lineage DAG

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Outcome of an experiment relative to its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    /// Metric moved in the good direction.
    Improved,
    /// Metric moved in the bad direction.
    Degraded,
    /// No meaningful metric movement.
    Neutral,
    /// The run did not produce a usable result. Never eligible as best.
    Failed,
}

impl ExperimentStatus {
    /// All valid status tokens, for error messages.
    pub const VALID: &'static str = "improved|degraded|neutral|failed";
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Improved => "improved",
            Self::Degraded => "degraded",
            Self::Neutral => "neutral",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for ExperimentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "improved" => Ok(Self::Improved),
            "degraded" => Ok(Self::Degraded),
            "neutral" => Ok(Self::Neutral),
            "failed" => Ok(Self::Failed),
            other => Err(Error::Validation(format!(
                "invalid status {other:?}: must be {}",
                Self::VALID
            ))),
        }
    }
}

/// Primary metric result attached to an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricResult {
    /// Metric name (copied from the project config at log time).
    #[serde(default)]
    pub name: String,
    /// Observed value.
    #[serde(default)]
    pub value: f64,
    /// Reference value the delta was computed against, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    /// `value - baseline`, if a baseline was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
}

/// One change relative to a parent experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Change {
    /// Change kind: `param`, `added`, `removed`, or `changed`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Parameter name when `kind` is `param`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub param: String,
    /// Description when `kind` is `added`/`removed`/`changed`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub what: String,
    /// Previous value.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from: String,
    /// New value.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to: String,
}

/// Why the author expected this experiment to work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Reasoning {
    /// `proven`, `assumption`, or `unknown`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Free-form reasoning text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Experiment ID → observation backing the reasoning.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub evidence: HashMap<String, String>,
}

/// Execution environment fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Environment {
    /// Python version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub python: String,
    /// GPU model.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gpu: String,
    /// Package name → version for the packages that matter.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub key_packages: HashMap<String, String>,
    /// Hash over the input data.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data_hash: String,
    /// Train/validation split seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_seed: Option<i64>,
    /// Hash over the preprocessing pipeline.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preprocessing_hash: String,
}

/// One recorded experiment.
///
/// Immutable after logging except through an explicit edit, which may only
/// touch notes, status, and tags. Parents reference earlier experiment IDs;
/// the references form a DAG by convention but are not validated for cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Monotonic human-readable ID, e.g. `exp_001`.
    pub id: String,
    /// Creation time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Model family label: xgboost, resnet, llama, ...
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_model: String,

    /// IDs of the experiments this one was derived from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// Parent ID → list of changes relative to that parent.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub changes_from: HashMap<String, Vec<Change>>,

    /// Primary metric result.
    pub metric: MetricResult,
    /// Outcome status.
    pub status: ExperimentStatus,
    /// Reasoning behind the attempt.
    #[serde(default, skip_serializing_if = "reasoning_is_empty")]
    pub reasoning: Reasoning,

    /// Environment fingerprint, when captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    /// Local cross-validation score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_cv: Option<f64>,
    /// Public leaderboard score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_lb: Option<f64>,

    /// Version of the dataset this experiment ran on.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub data_version: u32,

    /// Free-form tags, order-preserving on input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Experiment {
    /// Create a minimal experiment with the current timestamp.
    #[must_use]
    pub fn new(id: impl Into<String>, metric: MetricResult, status: ExperimentStatus) -> Self {
        Self {
            id: id.into(),
            timestamp: Utc::now(),
            base_model: String::new(),
            parents: Vec::new(),
            changes_from: HashMap::new(),
            metric,
            status,
            reasoning: Reasoning::default(),
            environment: None,
            local_cv: None,
            public_lb: None,
            data_version: 0,
            tags: Vec::new(),
            notes: String::new(),
        }
    }
}

fn reasoning_is_empty(r: &Reasoning) -> bool {
    r.kind.is_empty() && r.text.is_empty() && r.evidence.is_empty()
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &u32) -> bool {
    *v == 0
}
