//! Agent-callable tool surface
//!
//! The call abstraction the agent gateway consumes: named string/number
//! parameters in, a text payload plus an error flag out. Wire framing and
//! transport live in the gateway, not here.
//!
//! Mutating tools serialize behind a single lock so read-modify-write
//! sequences on the index and changelog cannot interleave within one
//! process. There is no cross-process locking (known limitation).

mod handlers;

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::store::Store;

/// One named parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolValue {
    /// A string parameter.
    Text(String),
    /// A numeric parameter.
    Number(f64),
}

/// A tool invocation: a bag of named parameters.
#[derive(Debug, Clone, Default)]
pub struct ToolRequest {
    params: HashMap<String, ToolValue>,
}

impl ToolRequest {
    /// An empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string parameter.
    #[must_use]
    pub fn with_str(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), ToolValue::Text(value.into()));
        self
    }

    /// Add a numeric parameter.
    #[must_use]
    pub fn with_number(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), ToolValue::Number(value));
        self
    }

    /// String parameter with a default. Numbers are rendered when a caller
    /// sent a number where a string was expected.
    #[must_use]
    pub fn get_str(&self, name: &str, default: &str) -> String {
        match self.params.get(name) {
            Some(ToolValue::Text(s)) => s.clone(),
            Some(ToolValue::Number(n)) => n.to_string(),
            None => default.to_string(),
        }
    }

    /// Required string parameter.
    ///
    /// # Errors
    ///
    /// `Error::Validation` when the parameter is missing.
    pub fn require_str(&self, name: &str) -> Result<String> {
        match self.params.get(name) {
            Some(ToolValue::Text(s)) => Ok(s.clone()),
            Some(ToolValue::Number(n)) => Ok(n.to_string()),
            None => Err(Error::Validation(format!(
                "missing required parameter: {name}"
            ))),
        }
    }

    /// Numeric parameter with a default.
    #[must_use]
    pub fn get_number(&self, name: &str, default: f64) -> f64 {
        match self.params.get(name) {
            Some(ToolValue::Number(n)) => *n,
            Some(ToolValue::Text(s)) => s.parse().unwrap_or(default),
            None => default,
        }
    }

    /// Required numeric parameter.
    ///
    /// # Errors
    ///
    /// `Error::Validation` when the parameter is missing or non-numeric.
    pub fn require_number(&self, name: &str) -> Result<f64> {
        match self.params.get(name) {
            Some(ToolValue::Number(n)) => Ok(*n),
            Some(ToolValue::Text(s)) => s.parse().map_err(|_| {
                Error::Validation(format!("parameter {name} must be a number"))
            }),
            None => Err(Error::Validation(format!(
                "missing required parameter: {name}"
            ))),
        }
    }
}

/// A tool result: a text payload and an error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    /// The payload (or the error message when `is_error` is set).
    pub text: String,
    /// True when the call failed.
    pub is_error: bool,
}

impl ToolResponse {
    /// A successful result.
    #[must_use]
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    /// A failed result.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// The tool handlers over one store.
pub struct Tools {
    store: Store,
    write_lock: Mutex<()>,
}

impl Tools {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Dispatch a call by tool name.
    #[must_use]
    pub fn call(&self, name: &str, req: &ToolRequest) -> ToolResponse {
        match name {
            "get_project_summary" => self.get_project_summary(),
            "get_best_experiment" => self.get_best_experiment(req),
            "get_experiment" => self.get_experiment(req),
            "get_learnings" => self.get_learnings(req),
            "get_failures" => self.get_failures(req),
            "get_data_context" => self.get_data_context(req),
            "get_changelog" => self.get_changelog(req),
            "get_experiment_chain" => self.get_experiment_chain(req),
            "get_experiments_by_tag" => self.get_experiments_by_tag(req),
            "compare_experiments" => self.compare_experiments(req),
            "get_all_experiments" => self.get_all_experiments(req),
            "log_experiment" => self.log_experiment(req),
            "add_learning" => self.add_learning(req),
            "add_graveyard_entry" => self.add_graveyard_entry(req),
            "update_pinned" => self.update_pinned(req),
            "get_prelude" => self.get_prelude(req),
            other => ToolResponse::error(format!("unknown tool: {other}")),
        }
    }

    fn locked<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.write_lock.lock();
        f()
    }
}

/// Render accumulated warnings under a marker that cannot be mistaken for
/// part of a success payload.
#[must_use]
pub fn format_warnings(warnings: &[String]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    format!("\n\n⚠ Warnings:\n  - {}", warnings.join("\n  - "))
}
