//! Error types for option-file loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while reading or parsing an option file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the option file
    #[error("failed to read option file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The option file contains a malformed line
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The option file exceeds the size limit
    #[error("option file '{path}' exceeds size limit: {size} bytes > {limit} bytes")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },
}

impl ConfigError {
    /// Create a FileRead error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a Parse error for a 1-based line number.
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// True if the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FileRead { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
