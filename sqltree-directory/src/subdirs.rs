//! Listing of immediate child directories.

use crate::config::LayoutConfig;
use crate::error::{DirectoryError, Result};
use crate::path_node::PathNode;
use std::fs;

impl<C: LayoutConfig> PathNode<C> {
    /// Immediate child directories, in directory-listing order.
    ///
    /// Symlinks are not followed, so a link to a directory is not a subdir.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be listed.
    pub fn subdirs(&self) -> Result<Vec<PathNode<C>>> {
        let mut result = Vec::new();
        for entry in self.read_entries()? {
            let file_type = entry
                .file_type()
                .map_err(|e| DirectoryError::io("inspect", entry.path(), e))?;
            if file_type.is_dir() {
                result.push(PathNode::from_clean(entry.path()));
            }
        }
        Ok(result)
    }

    /// All entries directly inside this directory.
    pub(crate) fn read_entries(&self) -> Result<Vec<fs::DirEntry>> {
        let list_error = |e: std::io::Error| DirectoryError::io("list directory", self.path(), e);
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.path()).map_err(list_error)? {
            entries.push(entry.map_err(list_error)?);
        }
        Ok(entries)
    }
}
