//! Project configuration document

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which way the primary metric should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDirection {
    /// Larger values win (accuracy, AUC).
    HigherIsBetter,
    /// Smaller values win (loss, RMSE).
    LowerIsBetter,
}

impl MetricDirection {
    /// True when `candidate` strictly beats `incumbent` in this direction.
    ///
    /// Strict comparison on purpose: a tie leaves the incumbent in place, so
    /// the earlier-seen experiment keeps the title.
    #[must_use]
    pub fn beats(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::HigherIsBetter => candidate > incumbent,
            Self::LowerIsBetter => candidate < incumbent,
        }
    }
}

/// Primary metric definition for the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MetricDef {
    /// Metric name, e.g. `auc`.
    #[serde(default)]
    pub name: String,
    /// `higher_is_better` or `lower_is_better`. Kept as a string so an
    /// unknown value round-trips; validated wherever a comparison is needed.
    #[serde(default)]
    pub direction: String,
    /// Known baseline value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
}

impl MetricDef {
    /// Parse and validate the direction string (case-insensitive).
    ///
    /// # Errors
    ///
    /// `Error::Validation` for anything other than the two known directions.
    /// Comparisons must never silently assume a default.
    pub fn direction(&self) -> Result<MetricDirection> {
        if self.direction.eq_ignore_ascii_case("higher_is_better") {
            Ok(MetricDirection::HigherIsBetter)
        } else if self.direction.eq_ignore_ascii_case("lower_is_better") {
            Ok(MetricDirection::LowerIsBetter)
        } else {
            Err(Error::Validation(format!(
                "invalid metric direction {:?}: must be higher_is_better or lower_is_better",
                self.direction
            )))
        }
    }
}

/// Project-level configuration, written once at init and rarely touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Project {
    /// Project name.
    #[serde(default)]
    pub name: String,
    /// One-line description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Template the project was created from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
    /// Task type, e.g. `binary_classification`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub task_type: String,
    /// The metric being optimized.
    #[serde(default)]
    pub metric: MetricDef,
    /// Current dataset version.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub data_version: u32,
    /// Project-wide tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Anything else worth pinning to the config.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &u32) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        let m = MetricDef {
            name: "auc".to_string(),
            direction: "higher_is_better".to_string(),
            baseline: None,
        };
        assert_eq!(m.direction().unwrap(), MetricDirection::HigherIsBetter);

        let m = MetricDef {
            direction: "LOWER_IS_BETTER".to_string(),
            ..MetricDef::default()
        };
        assert_eq!(m.direction().unwrap(), MetricDirection::LowerIsBetter);
    }

    #[test]
    fn test_direction_rejects_unknown() {
        let m = MetricDef {
            direction: "sideways".to_string(),
            ..MetricDef::default()
        };
        assert!(matches!(m.direction(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_beats_is_strict() {
        assert!(MetricDirection::HigherIsBetter.beats(0.9, 0.8));
        assert!(!MetricDirection::HigherIsBetter.beats(0.8, 0.8));
        assert!(MetricDirection::LowerIsBetter.beats(0.1, 0.2));
        assert!(!MetricDirection::LowerIsBetter.beats(0.2, 0.2));
    }
}
