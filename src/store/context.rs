//! Named free-form context documents (eda, features, pipeline notes, ...)

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Reject names that would escape the context directory.
fn safe_name(name: &str) -> Result<()> {
    let is_plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).components().count() == 1;
    if is_plain {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "invalid name {name:?}: must be a plain filename without path separators"
        )))
    }
}

impl super::Store {
    /// Read a context document as a structured YAML value.
    ///
    /// # Errors
    ///
    /// `Error::Validation` for an unsafe name, `Error::NotFound` when the
    /// document does not exist.
    pub fn read_context(&self, name: &str) -> Result<serde_yaml::Value> {
        safe_name(name)?;
        self.read_yaml(&self.context_path(name)).map_err(|e| {
            if e.is_file_missing() {
                Error::not_found("context", name)
            } else {
                e
            }
        })
    }

    /// Write a context document.
    ///
    /// # Errors
    ///
    /// `Error::Validation` for an unsafe name, plus write failures.
    pub fn write_context(&self, name: &str, data: &serde_yaml::Value) -> Result<()> {
        safe_name(name)?;
        self.write_yaml(&self.context_path(name), data)
    }

    /// Names of all context documents (without extension).
    ///
    /// # Errors
    ///
    /// Fails on directory read errors other than "not found".
    pub fn list_context_names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.context_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read a context document verbatim, for passing through to a caller.
    ///
    /// # Errors
    ///
    /// `Error::Validation` for an unsafe name, `Error::NotFound` when the
    /// document does not exist.
    pub fn read_context_raw(&self, name: &str) -> Result<String> {
        safe_name(name)?;
        fs::read_to_string(self.context_path(name)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found("context", name)
            } else {
                e.into()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name_rejects_traversal() {
        assert!(safe_name("eda").is_ok());
        assert!(safe_name("feature_notes").is_ok());
        assert!(safe_name("../escape").is_err());
        assert!(safe_name("a/b").is_err());
        assert!(safe_name("a\\b").is_err());
        assert!(safe_name("..").is_err());
        assert!(safe_name("").is_err());
    }
}
