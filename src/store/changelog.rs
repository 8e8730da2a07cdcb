//! Capped changelog persistence

use chrono::{DateTime, Utc};
use tracing::debug;

use super::Store;
use crate::error::Result;
use crate::record::{ChangelogEntry, ChangelogFile};

/// Ceiling on retained changelog entries; oldest rotate out past this.
pub const MAX_CHANGELOG_ENTRIES: usize = 1000;

impl Store {
    /// Read the changelog. An absent file is an empty log, not an error.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or decoded.
    pub fn read_changelog(&self) -> Result<ChangelogFile> {
        match self.read_yaml(&self.changelog_path()) {
            Ok(cf) => Ok(cf),
            Err(e) if e.is_file_missing() => Ok(ChangelogFile::default()),
            Err(e) => Err(e),
        }
    }

    /// Append one entry, defaulting its timestamp to now, and rotate the log
    /// down to the most recent [`MAX_CHANGELOG_ENTRIES`].
    ///
    /// Callers treat a failure here as advisory; it must never roll back the
    /// primary mutation that triggered it.
    ///
    /// # Errors
    ///
    /// Fails on read or write failure.
    pub fn append_changelog(&self, mut entry: ChangelogEntry) -> Result<()> {
        let mut cf = self.read_changelog()?;

        if entry.timestamp.is_none() {
            entry.timestamp = Some(Utc::now());
        }
        cf.entries.push(entry);

        if cf.entries.len() > MAX_CHANGELOG_ENTRIES {
            let drop = cf.entries.len() - MAX_CHANGELOG_ENTRIES;
            cf.entries.drain(..drop);
            debug!(dropped = drop, "rotated changelog");
        }

        self.write_yaml(&self.changelog_path(), &cf)
    }

    /// Entries at or after `since`, oldest first.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Store::read_changelog`].
    pub fn read_changelog_since(&self, since: DateTime<Utc>) -> Result<Vec<ChangelogEntry>> {
        let cf = self.read_changelog()?;
        Ok(cf
            .entries
            .into_iter()
            .filter(|e| e.timestamp.is_some_and(|ts| ts >= since))
            .collect())
    }
}
