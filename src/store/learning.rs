//! Learnings and graveyard persistence: two shared YAML documents

use tracing::debug;

use super::{next_id, Store};
use crate::error::{Error, Result};
use crate::record::{GraveyardEntry, GraveyardFile, Learning, LearningType, LearningsFile};

impl Store {
    /// Read the learnings document.
    ///
    /// # Errors
    ///
    /// Fails when the document is missing or malformed.
    pub fn read_learnings(&self) -> Result<LearningsFile> {
        self.read_yaml(&self.learnings_path())
    }

    /// Persist the learnings document.
    ///
    /// # Errors
    ///
    /// Fails on write failure.
    pub fn write_learnings(&self, lf: &LearningsFile) -> Result<()> {
        self.write_yaml(&self.learnings_path(), lf)
    }

    /// Append a learning, assigning the next sequential ID across both lists.
    ///
    /// Returns the assigned ID.
    ///
    /// # Errors
    ///
    /// Fails on read or write failure.
    pub fn add_learning(&self, mut learning: Learning) -> Result<String> {
        let mut lf = self.read_learnings()?;

        let existing = lf
            .proven
            .iter()
            .chain(lf.assumptions.iter())
            .map(|l| l.id.as_str());
        learning.id = next_id("learn_", existing);
        let id = learning.id.clone();

        match learning.kind {
            LearningType::Proven => lf.proven.push(learning),
            LearningType::Assumption => lf.assumptions.push(learning),
        }

        self.write_learnings(&lf)?;
        debug!(%id, "added learning");
        Ok(id)
    }

    /// Delete a learning by ID from whichever list holds it.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when no learning carries `id`.
    pub fn delete_learning(&self, id: &str) -> Result<()> {
        let mut lf = self.read_learnings()?;

        let before = lf.proven.len() + lf.assumptions.len();
        lf.proven.retain(|l| l.id != id);
        lf.assumptions.retain(|l| l.id != id);
        if lf.proven.len() + lf.assumptions.len() == before {
            return Err(Error::not_found("learning", id));
        }

        self.write_learnings(&lf)
    }

    /// Read the graveyard document.
    ///
    /// # Errors
    ///
    /// Fails when the document is missing or malformed.
    pub fn read_graveyard(&self) -> Result<GraveyardFile> {
        self.read_yaml(&self.graveyard_path())
    }

    /// Persist the graveyard document.
    ///
    /// # Errors
    ///
    /// Fails on write failure.
    pub fn write_graveyard(&self, gf: &GraveyardFile) -> Result<()> {
        self.write_yaml(&self.graveyard_path(), gf)
    }

    /// Append a graveyard entry, assigning the next sequential ID.
    ///
    /// Returns the assigned ID.
    ///
    /// # Errors
    ///
    /// Fails on read or write failure.
    pub fn add_graveyard_entry(&self, mut entry: GraveyardEntry) -> Result<String> {
        let mut gf = self.read_graveyard()?;

        entry.id = next_id("grave_", gf.entries.iter().map(|g| g.id.as_str()));
        let id = entry.id.clone();
        gf.entries.push(entry);

        self.write_graveyard(&gf)?;
        debug!(%id, "added graveyard entry");
        Ok(id)
    }

    /// Delete a graveyard entry by ID.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when no entry carries `id`.
    pub fn delete_graveyard_entry(&self, id: &str) -> Result<()> {
        let mut gf = self.read_graveyard()?;

        let before = gf.entries.len();
        gf.entries.retain(|g| g.id != id);
        if gf.entries.len() == before {
            return Err(Error::not_found("graveyard entry", id));
        }

        self.write_graveyard(&gf)
    }
}
