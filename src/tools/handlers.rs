//! Individual tool handlers
//!
//! Read-only handlers go straight to the store; mutating handlers run the
//! matching operation under the write lock and fold its advisory warnings
//! into the payload. Handler errors come back as an error-flagged response,
//! never as a panic or a poisoned state.

use std::fmt::Write as _;

use chrono::NaiveDate;

use super::{format_warnings, ToolRequest, ToolResponse, Tools};
use crate::format::{
    changelog_one_liner, estimate_tokens, experiment_one_liner, filter_experiment,
    filter_learning, graveyard_one_liner, learning_one_liner, to_yaml_string,
};
use crate::ops;
use crate::record::{
    Depth, Experiment, ExperimentStatus, GraveyardEntry, Learning, MetricDirection,
};
use crate::tags::split_tags;

fn result_with_meta(text: &str, depth: &str) -> ToolResponse {
    ToolResponse::ok(format!(
        "[tokens≈{} depth={depth}]\n{text}",
        estimate_tokens(text)
    ))
}

fn experiment_result(exp: &Experiment, depth: Depth) -> ToolResponse {
    if depth == Depth::Summary {
        let text = experiment_one_liner(exp);
        return result_with_meta(&text, "summary");
    }
    match to_yaml_string(&filter_experiment(exp, depth)) {
        Ok(yaml) => result_with_meta(&yaml, &depth.to_string()),
        Err(e) => ToolResponse::error(format!("marshaling failed: {e}")),
    }
}

fn experiments_result(exps: &[Experiment], depth: Depth) -> ToolResponse {
    let mut b = String::new();
    for exp in exps {
        if depth == Depth::Summary {
            let _ = writeln!(b, "{}", experiment_one_liner(exp));
        } else {
            match to_yaml_string(&filter_experiment(exp, depth)) {
                Ok(yaml) => {
                    b.push_str(&yaml);
                    b.push_str("---\n");
                }
                Err(e) => return ToolResponse::error(format!("marshaling failed: {e}")),
            }
        }
    }
    result_with_meta(&b, &depth.to_string())
}

impl Tools {
    pub(super) fn get_project_summary(&self) -> ToolResponse {
        let project = match self.store().read_project() {
            Ok(p) => p,
            Err(e) => return ToolResponse::error(format!("failed to read project: {e}")),
        };
        let index = match self.store().read_index() {
            Ok(i) => i,
            Err(e) => return ToolResponse::error(format!("failed to read index: {e}")),
        };

        let mut b = String::new();
        let _ = writeln!(b, "Project: {}", project.name);
        if !project.description.is_empty() {
            let _ = writeln!(b, "Description: {}", project.description);
        }
        let _ = writeln!(
            b,
            "Task: {}\nMetric: {} ({})",
            project.task_type, project.metric.name, project.metric.direction
        );
        let _ = writeln!(b, "\n--- Index ---");
        let c = &index.computed;
        let _ = writeln!(b, "Experiments: {}", c.total_experiments);
        if let (false, Some(best)) = (c.best_experiment.is_empty(), &c.best_metric) {
            let _ = writeln!(
                b,
                "Best: {} ({} = {:.4})",
                c.best_experiment, best.name, best.value
            );
        }
        if !c.experiment_chain.is_empty() {
            let _ = writeln!(b, "Chain: {}", c.experiment_chain.join(" → "));
        }
        let _ = writeln!(
            b,
            "Proven: {} | Assumptions: {} | Graveyard: {}",
            c.proven_count, c.assumption_count, c.graveyard_count
        );

        let p = &index.pinned;
        for (title, items) in [
            ("Do Not Try", &p.do_not_try),
            ("Data Warnings", &p.data_warnings),
            ("Deferred", &p.deferred),
        ] {
            if !items.is_empty() {
                let _ = writeln!(b, "\n{title}:");
                for item in items {
                    let _ = writeln!(b, "  - {item}");
                }
            }
        }
        if !p.notes.is_empty() {
            let _ = writeln!(b, "\nNotes: {}", p.notes);
        }

        result_with_meta(&b, "summary")
    }

    pub(super) fn get_best_experiment(&self, req: &ToolRequest) -> ToolResponse {
        let index = match self.store().read_index() {
            Ok(i) => i,
            Err(e) => return ToolResponse::error(format!("failed to read index: {e}")),
        };
        if index.computed.best_experiment.is_empty() {
            return ToolResponse::ok("No experiments yet.");
        }
        let exp = match self.store().read_experiment(&index.computed.best_experiment) {
            Ok(exp) => exp,
            Err(e) => return ToolResponse::error(format!("failed to read experiment: {e}")),
        };
        experiment_result(&exp, Depth::parse(&req.get_str("depth", "standard")))
    }

    pub(super) fn get_experiment(&self, req: &ToolRequest) -> ToolResponse {
        let id = match req.require_str("id") {
            Ok(id) => id,
            Err(e) => return ToolResponse::error(e.to_string()),
        };
        match self.store().read_experiment(&id) {
            Ok(exp) => experiment_result(&exp, Depth::parse(&req.get_str("depth", "full"))),
            Err(e) => ToolResponse::error(format!("experiment not found: {e}")),
        }
    }

    pub(super) fn get_learnings(&self, req: &ToolRequest) -> ToolResponse {
        let lf = match self.store().read_learnings() {
            Ok(lf) => lf,
            Err(e) => return ToolResponse::error(format!("failed to read learnings: {e}")),
        };

        let kind = req.get_str("type", "all");
        let depth = Depth::parse(&req.get_str("depth", "summary"));

        let mut b = String::new();
        let mut render = |title: &str, list: &[Learning]| -> crate::error::Result<()> {
            if list.is_empty() {
                return Ok(());
            }
            b.push_str(title);
            b.push('\n');
            for learning in list {
                let filtered = filter_learning(learning, depth);
                if depth == Depth::Summary {
                    let _ = writeln!(b, "  {}", learning_one_liner(&filtered));
                } else {
                    b.push_str(&to_yaml_string(&filtered)?);
                }
            }
            Ok(())
        };

        if kind == "all" || kind == "proven" {
            if let Err(e) = render("Proven:", &lf.proven) {
                return ToolResponse::error(format!("failed to marshal learning: {e}"));
            }
        }
        if kind == "all" || kind == "assumption" {
            if let Err(e) = render("Assumptions:", &lf.assumptions) {
                return ToolResponse::error(format!("failed to marshal learning: {e}"));
            }
        }

        if b.is_empty() {
            return ToolResponse::ok("No learnings yet.");
        }
        result_with_meta(&b, &depth.to_string())
    }

    pub(super) fn get_failures(&self, req: &ToolRequest) -> ToolResponse {
        let gf = match self.store().read_graveyard() {
            Ok(gf) => gf,
            Err(e) => return ToolResponse::error(format!("failed to read graveyard: {e}")),
        };
        if gf.entries.is_empty() {
            return ToolResponse::ok("Graveyard is empty.");
        }

        let depth = Depth::parse(&req.get_str("depth", "summary"));
        let mut b = String::from("Failed Approaches:\n");
        for entry in &gf.entries {
            if depth == Depth::Summary {
                let _ = writeln!(b, "  {}", graveyard_one_liner(entry));
            } else {
                match to_yaml_string(entry) {
                    Ok(yaml) => b.push_str(&yaml),
                    Err(e) => {
                        return ToolResponse::error(format!(
                            "failed to marshal graveyard entry: {e}"
                        ))
                    }
                }
            }
        }
        result_with_meta(&b, &depth.to_string())
    }

    pub(super) fn get_data_context(&self, req: &ToolRequest) -> ToolResponse {
        let name = match req.require_str("name") {
            Ok(name) => name,
            Err(e) => return ToolResponse::error(e.to_string()),
        };
        match self.store().read_context_raw(&name) {
            Ok(raw) => result_with_meta(&raw, "full"),
            Err(_) => {
                let names = self.store().list_context_names().unwrap_or_default();
                ToolResponse::error(format!(
                    "context {name:?} not found. Available: {}",
                    names.join(", ")
                ))
            }
        }
    }

    pub(super) fn get_changelog(&self, req: &ToolRequest) -> ToolResponse {
        let since = req.get_str("since", "");

        let entries = if since.is_empty() {
            match self.store().read_changelog() {
                Ok(cf) => cf.entries,
                Err(e) => return ToolResponse::error(format!("failed to read changelog: {e}")),
            }
        } else {
            let Ok(date) = NaiveDate::parse_from_str(&since, "%Y-%m-%d") else {
                return ToolResponse::error("invalid date format, use YYYY-MM-DD");
            };
            let cutoff = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
            let Some(cutoff) = cutoff else {
                return ToolResponse::error("invalid date format, use YYYY-MM-DD");
            };
            match self.store().read_changelog_since(cutoff) {
                Ok(entries) => entries,
                Err(e) => return ToolResponse::error(format!("failed to read changelog: {e}")),
            }
        };

        if entries.is_empty() {
            return ToolResponse::ok("No changelog entries.");
        }
        let mut b = String::new();
        for entry in &entries {
            let _ = writeln!(b, "{}", changelog_one_liner(entry));
        }
        result_with_meta(&b, "summary")
    }

    pub(super) fn get_experiment_chain(&self, req: &ToolRequest) -> ToolResponse {
        let index = match self.store().read_index() {
            Ok(i) => i,
            Err(e) => return ToolResponse::error(format!("failed to read index: {e}")),
        };
        if index.computed.experiment_chain.is_empty() {
            return ToolResponse::ok("No experiment chain.");
        }

        let depth = Depth::parse(&req.get_str("depth", "summary"));
        let mut b = String::new();
        for id in &index.computed.experiment_chain {
            // tolerate a chain entry whose record has since gone missing
            let Ok(exp) = self.store().read_experiment(id) else {
                continue;
            };
            if depth == Depth::Summary {
                let _ = writeln!(b, "{}", experiment_one_liner(&exp));
            } else {
                match to_yaml_string(&filter_experiment(&exp, depth)) {
                    Ok(yaml) => {
                        b.push_str(&yaml);
                        b.push_str("---\n");
                    }
                    Err(e) => {
                        return ToolResponse::error(format!("failed to marshal experiment: {e}"))
                    }
                }
            }
        }
        result_with_meta(&b, &depth.to_string())
    }

    pub(super) fn get_experiments_by_tag(&self, req: &ToolRequest) -> ToolResponse {
        let tags_param = match req.require_str("tags") {
            Ok(tags) => tags,
            Err(e) => return ToolResponse::error(e.to_string()),
        };
        let tags = split_tags(&tags_param);

        let exps = match self.store().list_experiments_by_tag(&tags) {
            Ok(exps) => exps,
            Err(e) => return ToolResponse::error(format!("failed to list experiments: {e}")),
        };
        if exps.is_empty() {
            return ToolResponse::ok("No experiments match those tags.");
        }
        experiments_result(&exps, Depth::parse(&req.get_str("depth", "summary")))
    }

    pub(super) fn compare_experiments(&self, req: &ToolRequest) -> ToolResponse {
        let (id1, id2) = match (req.require_str("id1"), req.require_str("id2")) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => return ToolResponse::error(e.to_string()),
        };

        let exp1 = match self.store().read_experiment(&id1) {
            Ok(exp) => exp,
            Err(_) => return ToolResponse::error(format!("experiment {id1} not found")),
        };
        let exp2 = match self.store().read_experiment(&id2) {
            Ok(exp) => exp,
            Err(_) => return ToolResponse::error(format!("experiment {id2} not found")),
        };

        let mut b = String::new();
        let _ = writeln!(b, "Comparison: {id1} vs {id2}\n");
        for exp in [&exp1, &exp2] {
            let _ = writeln!(
                b,
                "{}:\n  {} = {:.4} | status: {} | model: {}",
                exp.id, exp.metric.name, exp.metric.value, exp.status, exp.base_model
            );
        }

        let delta = exp2.metric.value - exp1.metric.value;
        let mut warnings = Vec::new();
        let direction = match self.store().read_project().map(|p| p.metric.direction()) {
            Ok(Ok(direction)) => direction,
            Ok(Err(e)) | Err(e) => {
                warnings.push(format!("project unreadable, assuming higher_is_better: {e}"));
                MetricDirection::HigherIsBetter
            }
        };
        let verdict = if delta == 0.0 {
            "no change"
        } else if direction.beats(exp2.metric.value, exp1.metric.value) {
            "improvement"
        } else {
            "regression"
        };
        let _ = writeln!(b, "\nDelta: {delta:+.4} ({verdict})");

        if !exp2.notes.is_empty() {
            let _ = writeln!(b, "\n{id2} notes: {}", exp2.notes);
        }

        let text = b + &format_warnings(&warnings);
        result_with_meta(&text, "standard")
    }

    pub(super) fn get_all_experiments(&self, req: &ToolRequest) -> ToolResponse {
        let mut exps = match self.store().list_experiments() {
            Ok(exps) => exps,
            Err(e) => return ToolResponse::error(format!("failed to list experiments: {e}")),
        };
        if exps.is_empty() {
            return ToolResponse::ok("No experiments yet.");
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let limit = req.get_number("limit", 0.0) as usize;
        if limit > 0 && exps.len() > limit {
            exps.drain(..exps.len() - limit);
        }

        experiments_result(&exps, Depth::parse(&req.get_str("depth", "summary")))
    }

    pub(super) fn log_experiment(&self, req: &ToolRequest) -> ToolResponse {
        self.locked(|| {
            let status = match req.require_str("status") {
                Ok(s) => s,
                Err(e) => return ToolResponse::error(e.to_string()),
            };
            let status = match status.parse::<ExperimentStatus>() {
                Ok(status) => status,
                Err(e) => return ToolResponse::error(e.to_string()),
            };
            let metric_value = match req.require_number("metric_value") {
                Ok(v) => v,
                Err(e) => return ToolResponse::error(e.to_string()),
            };

            let draft = ops::ExperimentDraft {
                base_model: req.get_str("base_model", ""),
                parents: split_tags(&req.get_str("parents", "")),
                metric_value,
                status: Some(status),
                tags: split_tags(&req.get_str("tags", "")),
                notes: req.get_str("notes", ""),
            };

            match ops::log_experiment(self.store(), draft) {
                Ok(logged) => {
                    let exp = &logged.value;
                    ToolResponse::ok(format!(
                        "Logged experiment {} ({} = {:.4}, {}){}",
                        exp.id,
                        exp.metric.name,
                        exp.metric.value,
                        exp.status,
                        format_warnings(&logged.warnings)
                    ))
                }
                Err(e) => ToolResponse::error(format!("failed to log experiment: {e}")),
            }
        })
    }

    pub(super) fn add_learning(&self, req: &ToolRequest) -> ToolResponse {
        self.locked(|| {
            let text = match req.require_str("text") {
                Ok(t) => t,
                Err(e) => return ToolResponse::error(e.to_string()),
            };
            let kind = match req.require_str("type").and_then(|t| t.parse()) {
                Ok(kind) => kind,
                Err(e) => return ToolResponse::error(e.to_string()),
            };

            let mut learning = Learning::new(kind, text);
            learning.tags = split_tags(&req.get_str("tags", ""));

            match ops::add_learning(self.store(), learning) {
                Ok(added) => {
                    let mut out = format!(
                        "Added learning {} [{kind}]{}",
                        added.value.id,
                        format_warnings(&added.warnings)
                    );
                    if !added.value.conflicts.is_empty() {
                        out.push_str("\n\n⚠ Potential conflicts:");
                        for conflict in &added.value.conflicts {
                            let _ = write!(
                                out,
                                "\n  - Conflicts with {}: {}",
                                conflict.conflicts_with, conflict.conflicting_entry
                            );
                        }
                    }
                    ToolResponse::ok(out)
                }
                Err(e) => ToolResponse::error(format!("failed to add learning: {e}")),
            }
        })
    }

    pub(super) fn add_graveyard_entry(&self, req: &ToolRequest) -> ToolResponse {
        self.locked(|| {
            let (approach, reason) = match (req.require_str("approach"), req.require_str("reason"))
            {
                (Ok(a), Ok(r)) => (a, r),
                (Err(e), _) | (_, Err(e)) => return ToolResponse::error(e.to_string()),
            };

            let mut entry = GraveyardEntry::new(approach, reason);
            entry.experiment_id = req.get_str("experiment_id", "");
            entry.tags = split_tags(&req.get_str("tags", ""));

            match ops::add_graveyard_entry(self.store(), entry) {
                Ok(added) => ToolResponse::ok(format!(
                    "Added graveyard entry {}{}",
                    added.value,
                    format_warnings(&added.warnings)
                )),
                Err(e) => ToolResponse::error(format!("failed to add entry: {e}")),
            }
        })
    }

    pub(super) fn update_pinned(&self, req: &ToolRequest) -> ToolResponse {
        self.locked(|| {
            let field = match req.require_str("field").and_then(|f| f.parse()) {
                Ok(field) => field,
                Err(e) => return ToolResponse::error(e.to_string()),
            };
            let action = match req.require_str("action").and_then(|a| a.parse()) {
                Ok(action) => action,
                Err(e) => return ToolResponse::error(e.to_string()),
            };
            let value = match req.require_str("value") {
                Ok(v) => v,
                Err(e) => return ToolResponse::error(e.to_string()),
            };

            match ops::update_pinned(self.store(), field, action, &value) {
                Ok(done) => ToolResponse::ok(format!(
                    "Updated pinned.{field} ({action}: {value}){}",
                    format_warnings(&done.warnings)
                )),
                Err(e) => ToolResponse::error(format!("failed to update pinned: {e}")),
            }
        })
    }

    pub(super) fn get_prelude(&self, req: &ToolRequest) -> ToolResponse {
        let intent = match req.require_str("intent") {
            Ok(i) => i.to_lowercase(),
            Err(e) => return ToolResponse::error(e.to_string()),
        };

        let project = match self.store().read_project() {
            Ok(p) => p,
            Err(e) => return ToolResponse::error(format!("failed to read project: {e}")),
        };
        // index may not exist yet; fields default to their zero values
        let index = self.store().read_index().unwrap_or_default();

        let mut b = String::new();
        let _ = writeln!(
            b,
            "Project: {} | Task: {} | Metric: {} ({})",
            project.name, project.task_type, project.metric.name, project.metric.direction
        );
        let c = &index.computed;
        if let (false, Some(best)) = (c.best_experiment.is_empty(), &c.best_metric) {
            let _ = writeln!(
                b,
                "Best: {} ({} = {:.4})",
                c.best_experiment, best.name, best.value
            );
        }

        if contains_any(&intent, &["feature", "eda", "data", "column", "variable"]) {
            b.push_str("\n--- Data Context ---\n");
            for name in self.store().list_context_names().unwrap_or_default() {
                let name_lower = name.to_lowercase();
                let relevant = contains_any(
                    &name_lower,
                    &["eda", "feature", "data", "column", "variable", "pipeline", "overview"],
                ) || intent.contains(&name_lower);
                if relevant {
                    if let Ok(raw) = self.store().read_context_raw(&name) {
                        let _ = writeln!(b, "[{name}]\n{raw}");
                    }
                }
            }
            if !index.pinned.data_warnings.is_empty() {
                b.push_str("Data Warnings:\n");
                for warning in &index.pinned.data_warnings {
                    let _ = writeln!(b, "  - {warning}");
                }
            }
        }

        if contains_any(
            &intent,
            &["hyperparameter", "tune", "tuning", "lr", "learning rate", "param"],
        ) {
            b.push_str("\n--- HP Tuning Context ---\n");
            let tuning_tags: Vec<String> = ["lr_tuning", "hp_tuning", "tuning", "hyperparameter"]
                .iter()
                .map(|&t| t.to_string())
                .collect();
            let exps = self
                .store()
                .list_experiments_by_tag(&tuning_tags)
                .unwrap_or_default();
            for exp in &exps {
                let _ = writeln!(b, "  {}", experiment_one_liner(exp));
            }
        }

        if contains_any(
            &intent,
            &["fail", "error", "avoid", "not work", "graveyard", "wrong"],
        ) {
            b.push_str("\n--- Failures ---\n");
            let gf = self.store().read_graveyard().unwrap_or_default();
            for entry in &gf.entries {
                let _ = writeln!(b, "  {}", graveyard_one_liner(entry));
            }
            if !index.pinned.do_not_try.is_empty() {
                b.push_str("Do Not Try:\n");
                for item in &index.pinned.do_not_try {
                    let _ = writeln!(b, "  - {item}");
                }
            }
        }

        if contains_any(&intent, &["model", "architecture", "network", "backbone"]) {
            b.push_str("\n--- Best Experiment (full) ---\n");
            if !c.best_experiment.is_empty() {
                if let Ok(exp) = self.store().read_experiment(&c.best_experiment) {
                    if let Ok(yaml) = to_yaml_string(&exp) {
                        b.push_str(&yaml);
                    }
                }
            }
        }

        let lf = self.store().read_learnings().unwrap_or_default();
        if !lf.proven.is_empty() {
            b.push_str("\n--- Proven Learnings ---\n");
            for learning in &lf.proven {
                let _ = writeln!(b, "  {}", learning_one_liner(learning));
            }
        }

        result_with_meta(&b, "prelude")
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
