//! File-backed record store
//!
//! One directory per project, YAML documents inside:
//!
//! ```text
//! .labtrail/
//!   project.yaml            project config
//!   index.yaml              computed + pinned index
//!   changelog.yaml          capped audit log
//!   experiments/exp_*.yaml  one file per experiment
//!   learnings/learnings.yaml
//!   learnings/graveyard.yaml
//!   context/<name>.yaml     free-form context documents
//! ```
//!
//! Every write goes through [`Store::write_yaml`]: encode, write to a temp
//! file in the same directory, rename over the target. A reader never sees a
//! partially written document. There is no cross-process locking; concurrent
//! writers can lose updates but cannot corrupt a file.

mod changelog;
mod context;
mod experiment;
mod learning;

pub use changelog::MAX_CHANGELOG_ENTRIES;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{ChangelogFile, GraveyardFile, Index, LearningsFile, Project};

/// Name of the store directory under the project root.
pub const STORE_DIR: &str = ".labtrail";

/// Allocate the next sequential ID for a prefix, given the existing IDs.
///
/// Suffixes are zero-padded to at least 3 digits; once the counter passes 999
/// the padding widens to fit (`exp_999` → `exp_1000`, never `exp_0999`).
/// Malformed or non-numeric suffixes are ignored when computing the maximum.
#[must_use]
pub fn next_id<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let mut max = 0u64;
    for id in existing {
        if let Some(n) = id
            .strip_prefix(prefix)
            .and_then(|suffix| suffix.parse::<u64>().ok())
        {
            max = max.max(n);
        }
    }
    let next = max + 1;
    let width = if max >= 999 {
        next.to_string().len()
    } else {
        3
    };
    format!("{prefix}{next:0width$}")
}

/// Handle to one project's store directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Point at the store directory inside `project_dir`.
    ///
    /// Does not touch the filesystem; use [`Store::init`] to create it.
    #[must_use]
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            root: project_dir.as_ref().join(STORE_DIR),
        }
    }

    /// Absolute path to the store directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True when the store directory exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Create the directory tree and seed the initial documents.
    ///
    /// # Errors
    ///
    /// Fails on any directory creation or document write failure.
    pub fn init(&self, project: &Project) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.experiments_dir(),
            self.learnings_dir(),
            self.context_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }

        self.write_project(project)?;
        self.write_index(&Index::default())?;
        self.write_yaml(&self.changelog_path(), &ChangelogFile::default())?;
        self.write_learnings(&LearningsFile::default())?;
        self.write_graveyard(&GraveyardFile::default())?;

        debug!(root = %self.root.display(), "store initialized");
        Ok(())
    }

    /// Read the project config.
    ///
    /// # Errors
    ///
    /// Fails when the document is missing or malformed.
    pub fn read_project(&self) -> Result<Project> {
        self.read_yaml(&self.project_path())
    }

    /// Persist the project config.
    ///
    /// # Errors
    ///
    /// Fails on write failure.
    pub fn write_project(&self, project: &Project) -> Result<()> {
        self.write_yaml(&self.project_path(), project)
    }

    /// Read the index document (both halves).
    ///
    /// # Errors
    ///
    /// Fails when the document is missing or malformed; callers that can
    /// degrade check [`Error::is_file_missing`].
    pub fn read_index(&self) -> Result<Index> {
        self.read_yaml(&self.index_path())
    }

    /// Persist the index document.
    ///
    /// # Errors
    ///
    /// Fails on write failure.
    pub fn write_index(&self, index: &Index) -> Result<()> {
        self.write_yaml(&self.index_path(), index)
    }

    // --- paths ---

    pub(crate) fn project_path(&self) -> PathBuf {
        self.root.join("project.yaml")
    }

    pub(crate) fn index_path(&self) -> PathBuf {
        self.root.join("index.yaml")
    }

    pub(crate) fn changelog_path(&self) -> PathBuf {
        self.root.join("changelog.yaml")
    }

    pub(crate) fn experiments_dir(&self) -> PathBuf {
        self.root.join("experiments")
    }

    pub(crate) fn experiment_path(&self, id: &str) -> PathBuf {
        self.experiments_dir().join(format!("{id}.yaml"))
    }

    pub(crate) fn learnings_dir(&self) -> PathBuf {
        self.root.join("learnings")
    }

    pub(crate) fn learnings_path(&self) -> PathBuf {
        self.learnings_dir().join("learnings.yaml")
    }

    pub(crate) fn graveyard_path(&self) -> PathBuf {
        self.learnings_dir().join("graveyard.yaml")
    }

    pub(crate) fn context_dir(&self) -> PathBuf {
        self.root.join("context")
    }

    pub(crate) fn context_path(&self, name: &str) -> PathBuf {
        self.context_dir().join(format!("{name}.yaml"))
    }

    // --- codec ---

    pub(crate) fn read_yaml<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let text = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Atomic replace: encode, write a temp file next to the target, fix up
    /// permissions, rename. Preserves the permission bits of a pre-existing
    /// target across the rewrite.
    pub(crate) fn write_yaml<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let text = serde_yaml::to_string(value)?;
        let dir = path
            .parent()
            .ok_or_else(|| Error::Other(format!("no parent directory for {}", path.display())))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".labtrail-tmp-")
            .tempfile_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.flush()?;

        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }

        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        debug!(path = %path.display(), "wrote document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_basic() {
        assert_eq!(next_id("exp_", ["exp_001", "exp_002"]), "exp_003");
    }

    #[test]
    fn test_next_id_empty() {
        assert_eq!(next_id("exp_", []), "exp_001");
    }

    #[test]
    fn test_next_id_widens_at_1000() {
        assert_eq!(next_id("exp_", ["exp_999"]), "exp_1000");
        assert_eq!(next_id("exp_", ["exp_1000"]), "exp_1001");
    }

    #[test]
    fn test_next_id_ignores_malformed() {
        assert_eq!(next_id("exp_", ["exp_abc", "notes", "exp_005"]), "exp_006");
        assert_eq!(next_id("exp_", ["exp_x", "junk"]), "exp_001");
    }
}
