//! Error types for the document store

use std::path::PathBuf;

/// Errors raised by store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Caller used a category outside the fixed set (rejected, not corrected)
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// Referenced document or path does not exist
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path escapes the knowledge base root
    #[error("path outside knowledge base: {}", .0.display())]
    OutsideBase(PathBuf),

    /// Underlying filesystem failure
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_category_display() {
        let err = StoreError::InvalidCategory("bogus".to_string());
        assert!(err.to_string().contains("invalid category: bogus"));
    }

    #[test]
    fn not_found_display_includes_path() {
        let err = StoreError::NotFound(PathBuf::from("midnight/missing.md"));
        assert!(err.to_string().contains("missing.md"));
    }
}
