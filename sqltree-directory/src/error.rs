//! Error types for directory hierarchy operations.

use sqltree_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using DirectoryError.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Errors that can occur while inspecting or modifying a directory tree.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// A path that must be a directory exists as something else.
    #[error("path '{path}' already exists but is not a directory")]
    PathConflict { path: PathBuf },

    /// A filesystem operation failed for a reason other than plain absence.
    #[error("failed to {operation} '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a schema file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds size limit.
    #[error("file '{path}' exceeds size limit: {size} bytes > {limit} bytes")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// The directory's option file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DirectoryError {
    /// Create an Io error for `operation` on `path`.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Create a FileRead error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a PathConflict error.
    pub fn path_conflict(path: impl Into<PathBuf>) -> Self {
        Self::PathConflict { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_display_names_operation() {
        let err = DirectoryError::io(
            "list directory",
            "/srv/schemas",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            err.to_string(),
            "failed to list directory '/srv/schemas': denied"
        );
    }

    #[test]
    fn test_config_error_is_transparent() {
        let inner = ConfigError::parse("/srv/.sqltree", 4, "empty option name");
        let err: DirectoryError = inner.into();
        assert_eq!(err.to_string(), "/srv/.sqltree:4: empty option name");
    }
}
