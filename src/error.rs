//! Error types for labtrail

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Labtrail error types
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind (experiment, learning, graveyard entry, context)
        kind: &'static str,
        /// The ID that was looked up
        id: String,
    },

    /// Invalid enum value or malformed input, rejected before any write
    #[error("validation error: {0}")]
    Validation(String),

    /// Delete blocked because other experiments still reference the target
    #[error("cannot delete {id}: referenced as parent by {}", referenced_by.join(", "))]
    ReferencedAsParent {
        /// The experiment that was asked to be deleted
        id: String,
        /// Experiments whose parents include `id`
        referenced_by: Vec<String>,
    },

    /// Store root is missing or not initialized
    #[error("store not initialized at {0}")]
    NotInitialized(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML codec error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a `NotFound` error for the given entity kind and ID.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True when the underlying cause is a missing file.
    ///
    /// Several call sites treat "file absent" as an empty collection rather
    /// than a failure (changelog, experiment listing).
    #[must_use]
    pub fn is_file_missing(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("experiment", "exp_042");
        assert_eq!(err.to_string(), "experiment exp_042 not found");
    }

    #[test]
    fn test_referenced_as_parent_display() {
        let err = Error::ReferencedAsParent {
            id: "exp_001".to_string(),
            referenced_by: vec!["exp_002".to_string(), "exp_003".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "cannot delete exp_001: referenced as parent by exp_002, exp_003"
        );
    }

    #[test]
    fn test_is_file_missing() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.is_file_missing());
        assert!(!Error::Validation("bad".to_string()).is_file_missing());
    }
}
