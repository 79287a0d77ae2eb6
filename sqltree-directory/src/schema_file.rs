//! Schema-definition files directly inside one directory.
//!
//! Listing is not recursive. Each candidate file is loaded eagerly; a file
//! that cannot be read is still returned, carrying its own error, so one bad
//! file never hides the others.

use crate::config::LayoutConfig;
use crate::error::{DirectoryError, Result};
use crate::path_node::PathNode;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum schema file size to load (10MB).
pub const MAX_SCHEMA_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// One schema-definition file and the outcome of reading it.
pub struct SchemaFile<C: LayoutConfig> {
    dir: PathNode<C>,
    file_name: String,
    contents: Result<String>,
}

impl<C: LayoutConfig> SchemaFile<C> {
    fn load(dir: PathNode<C>, file_name: String) -> Self {
        let path = dir.path().join(&file_name);
        let contents = read_contents(&path);
        if let Err(e) = &contents {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load schema file");
        }
        Self {
            dir,
            file_name,
            contents,
        }
    }

    /// The enclosing directory.
    pub fn dir(&self) -> &PathNode<C> {
        &self.dir
    }

    /// File name without any directory part.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full path of the file.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join(&self.file_name)
    }

    /// File contents, if they were read successfully.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref().ok()
    }

    /// The error that prevented loading, if any.
    pub fn error(&self) -> Option<&DirectoryError> {
        self.contents.as_ref().err()
    }

    /// True if the contents were read successfully.
    pub fn is_loaded(&self) -> bool {
        self.contents.is_ok()
    }
}

impl<C: LayoutConfig> fmt::Debug for SchemaFile<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaFile")
            .field("dir", &self.dir)
            .field("file_name", &self.file_name)
            .field("contents", &self.contents)
            .finish()
    }
}

/// True if `name` has the layout's schema extension and a non-empty stem.
pub fn is_schema_file_name<C: LayoutConfig>(name: &str) -> bool {
    name.strip_suffix(C::SCHEMA_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|stem| !stem.is_empty())
}

impl<C: LayoutConfig> PathNode<C> {
    /// Schema files directly inside this directory, in listing order.
    ///
    /// # Errors
    ///
    /// Returns `Io` only if the directory itself cannot be listed. Per-file
    /// read failures are reported through [`SchemaFile::error`].
    pub fn schema_files(&self) -> Result<Vec<SchemaFile<C>>> {
        let entries = self.read_entries()?;
        let mut result = Vec::with_capacity(entries.len());

        for entry in entries {
            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!(path = %entry.path().display(), "Skipping non-UTF-8 file name");
                continue;
            };
            if let Some(reason) = self.rejection_reason(&name) {
                tracing::trace!(file = %name, dir = %self, reason, "Skipping schema candidate");
                continue;
            }
            result.push(SchemaFile::load(self.clone(), name));
        }

        // TODO: order files so that FOREIGN KEY targets precede the tables referencing them
        tracing::debug!(dir = %self, count = result.len(), "Listed schema files");
        Ok(result)
    }

    /// Why `name` is not a usable schema file, or `None` if it is.
    fn rejection_reason(&self, name: &str) -> Option<&'static str> {
        if !is_schema_file_name::<C>(name) {
            return Some("wrong extension");
        }

        let path = self.path().join(name);
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Some("not a regular file"),
            Err(_) => return Some("unable to stat"),
        }

        if !is_path_safe(&path, self.path()) {
            tracing::warn!(path = %path.display(), "Schema file resolves outside its directory");
            return Some("resolves outside directory");
        }
        None
    }
}

fn read_contents(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| DirectoryError::file_read(path, e))?;
    if metadata.len() > MAX_SCHEMA_FILE_SIZE {
        return Err(DirectoryError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: MAX_SCHEMA_FILE_SIZE,
        });
    }
    fs::read_to_string(path).map_err(|e| DirectoryError::file_read(path, e))
}

/// Validate that a path stays within the expected directory once symlinks resolve.
///
/// A path that cannot be canonicalized is not safe.
fn is_path_safe(path: &Path, base_dir: &Path) -> bool {
    match (path.canonicalize(), base_dir.canonicalize()) {
        (Ok(canonical_path), Ok(canonical_base)) => canonical_path.starts_with(&canonical_base),
        _ => false,
    }
}
