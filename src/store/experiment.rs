//! Experiment persistence: one YAML document per experiment

use std::fs;

use tracing::debug;

use super::{next_id, Store};
use crate::error::{Error, Result};
use crate::record::Experiment;

impl Store {
    /// Allocate the next experiment ID by scanning the experiments directory.
    ///
    /// # Errors
    ///
    /// Fails on directory read errors other than "not found" (an absent
    /// directory allocates `exp_001`).
    pub fn next_experiment_id(&self) -> Result<String> {
        let stems = match self.experiment_file_stems() {
            Ok(stems) => stems,
            Err(e) if e.is_file_missing() => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(next_id("exp_", stems.iter().map(String::as_str)))
    }

    /// Persist one experiment.
    ///
    /// # Errors
    ///
    /// Fails on encode or write failure.
    pub fn write_experiment(&self, exp: &Experiment) -> Result<()> {
        self.write_yaml(&self.experiment_path(&exp.id), exp)
    }

    /// Load one experiment by ID.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when no document exists for `id`.
    pub fn read_experiment(&self, id: &str) -> Result<Experiment> {
        self.read_yaml(&self.experiment_path(id)).map_err(|e| {
            if e.is_file_missing() {
                Error::not_found("experiment", id)
            } else {
                e
            }
        })
    }

    /// Load every experiment, sorted by ID ascending.
    ///
    /// An absent directory is an empty collection. A malformed document fails
    /// the whole listing: the store's structured data is expected to be
    /// internally consistent.
    ///
    /// # Errors
    ///
    /// Fails when any document cannot be read or decoded.
    pub fn list_experiments(&self) -> Result<Vec<Experiment>> {
        let dir = self.experiments_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut exps = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "yaml") {
                continue;
            }
            let exp: Experiment = self
                .read_yaml(&path)
                .map_err(|e| Error::Other(format!("reading {}: {e}", path.display())))?;
            exps.push(exp);
        }

        exps.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(exps)
    }

    /// Load experiments carrying at least one of the given tags (exact match).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Store::list_experiments`].
    pub fn list_experiments_by_tag(&self, tags: &[String]) -> Result<Vec<Experiment>> {
        let all = self.list_experiments()?;
        Ok(all
            .into_iter()
            .filter(|exp| exp.tags.iter().any(|t| tags.contains(t)))
            .collect())
    }

    /// Delete an experiment, refusing while any other experiment lists it as
    /// a parent.
    ///
    /// # Errors
    ///
    /// `Error::ReferencedAsParent` when the delete would break lineage,
    /// `Error::NotFound` when the experiment does not exist.
    pub fn delete_experiment(&self, id: &str) -> Result<()> {
        let refs = self.find_parent_refs(id)?;
        if !refs.is_empty() {
            return Err(Error::ReferencedAsParent {
                id: id.to_string(),
                referenced_by: refs,
            });
        }

        let path = self.experiment_path(id);
        if !path.exists() {
            return Err(Error::not_found("experiment", id));
        }
        fs::remove_file(&path)?;
        debug!(id, "deleted experiment");
        Ok(())
    }

    /// IDs of all experiments whose parents include `id`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Store::list_experiments`].
    pub fn find_parent_refs(&self, id: &str) -> Result<Vec<String>> {
        let exps = self.list_experiments()?;
        Ok(exps
            .into_iter()
            .filter(|e| e.parents.iter().any(|pid| pid == id))
            .map(|e| e.id)
            .collect())
    }

    fn experiment_file_stems(&self) -> Result<Vec<String>> {
        let mut stems = Vec::new();
        for entry in fs::read_dir(self.experiments_dir())? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stems.push(stem.to_string());
                }
            }
        }
        Ok(stems)
    }
}
