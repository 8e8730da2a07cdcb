//! Output shaping: depth projections, one-liners, YAML rendering
//!
//! Tool results go to a context-limited consumer, so every record can be
//! rendered at three depths. Projection works by clearing the fields a depth
//! hides and letting the serializer's presence rules drop them from the
//! output.

use std::fmt::Write as _;

use crate::error::Result;
use crate::record::{ChangelogEntry, Depth, Experiment, GraveyardEntry, Learning, Reasoning};

/// Rough token estimate for a rendered payload (4 bytes per token).
#[must_use]
pub fn estimate_tokens(s: &str) -> usize {
    (s.len() + 3) / 4
}

/// Render any serializable value as a YAML string.
///
/// # Errors
///
/// Fails when the value cannot be encoded.
pub fn to_yaml_string<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Project an experiment down to the fields a depth shows.
#[must_use]
pub fn filter_experiment(exp: &Experiment, depth: Depth) -> Experiment {
    match depth {
        Depth::Summary => {
            let mut slim = Experiment::new(exp.id.clone(), exp.metric.clone(), exp.status);
            slim.timestamp = exp.timestamp;
            slim.tags = exp.tags.clone();
            slim
        }
        Depth::Standard => {
            let mut std = exp.clone();
            std.reasoning = Reasoning::default();
            std.environment = None;
            std
        }
        Depth::Full => exp.clone(),
    }
}

/// Project a learning down to the fields a depth shows.
#[must_use]
pub fn filter_learning(learning: &Learning, depth: Depth) -> Learning {
    match depth {
        Depth::Summary => {
            let mut slim = Learning::new(learning.kind, learning.text.clone());
            slim.id = learning.id.clone();
            slim.timestamp = learning.timestamp;
            slim
        }
        Depth::Standard => {
            let mut std = learning.clone();
            std.evidence.clear();
            std
        }
        Depth::Full => learning.clone(),
    }
}

/// One-line rendering of an experiment: change summary, metric, status.
#[must_use]
pub fn experiment_one_liner(exp: &Experiment) -> String {
    let mut parts = Vec::new();

    let mut parent_ids: Vec<&String> = exp.changes_from.keys().collect();
    parent_ids.sort();

    for pid in parent_ids {
        for change in &exp.changes_from[pid] {
            match change.kind.as_str() {
                "param" => parts.push(format!("{}={}", change.param, change.to)),
                "added" => parts.push(format!("+{}", change.what)),
                "removed" => parts.push(format!("-{}", change.what)),
                _ => {
                    if !change.what.is_empty() {
                        parts.push(change.what.clone());
                    }
                }
            }
        }
    }

    let mut change_summary = parts.join(", ");
    if change_summary.is_empty() && !exp.base_model.is_empty() {
        change_summary = format!("baseline {}", exp.base_model);
    }

    let mut metric = format!("{} {:.4}", exp.metric.name, exp.metric.value);
    if let Some(delta) = exp.metric.delta {
        if delta != 0.0 {
            let _ = write!(metric, " ({delta:+.4})");
        }
    }

    if change_summary.is_empty() {
        format!("{} → {}, {}", exp.id, metric, exp.status)
    } else {
        format!("{} → {}, {}, {}", exp.id, change_summary, metric, exp.status)
    }
}

/// One-line rendering of a learning, text truncated to 80 chars.
#[must_use]
pub fn learning_one_liner(learning: &Learning) -> String {
    format!("[{}] {}", learning.kind, truncate(&learning.text, 80))
}

/// One-line rendering of a graveyard entry.
#[must_use]
pub fn graveyard_one_liner(entry: &GraveyardEntry) -> String {
    let approach = truncate(&entry.approach, 60);
    let reason = truncate(&entry.reason, 60);
    if entry.experiment_id.is_empty() {
        format!("✗ {approach} — {reason}")
    } else {
        format!("✗ {approach} — {reason} ({})", entry.experiment_id)
    }
}

/// One-line rendering of a changelog entry.
#[must_use]
pub fn changelog_one_liner(entry: &ChangelogEntry) -> String {
    let ts = entry
        .timestamp
        .map_or_else(|| "????-??-?? ??:??".to_string(), |t| {
            t.format("%Y-%m-%d %H:%M").to_string()
        });
    if !entry.summary.is_empty() {
        format!("[{ts}] {}: {}", entry.action, entry.summary)
    } else if !entry.id.is_empty() {
        format!("[{ts}] {}: {}", entry.action, entry.id)
    } else {
        format!("[{ts}] {}", entry.action)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
