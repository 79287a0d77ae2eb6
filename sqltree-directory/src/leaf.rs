//! Leaf classification: does a directory hold one schema, or group several?
//!
//! Directories are not required to declare their role. The first matching
//! rule wins:
//!
//! 1. the directory's own option file sets the schema key;
//! 2. the directory directly contains a schema file;
//! 3. the directory has no subdirectories at all.
//!
//! Anything else is a grouping directory. The result is recomputed from the
//! filesystem on every call.

use crate::config::LayoutConfig;
use crate::error::{DirectoryError, Result};
use crate::path_node::PathNode;
use crate::schema_file::is_schema_file_name;
use walkdir::WalkDir;

impl<C: LayoutConfig> PathNode<C> {
    /// True if this directory represents a single schema.
    ///
    /// A directory that cannot be listed has no visible subdirectories and
    /// is therefore a leaf unless its option file says otherwise.
    pub fn is_leaf(&self) -> bool {
        if self.has_config_file() {
            match self.config_file() {
                Ok(file) if file.declares_schema() => return true,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(dir = %self, error = %e, "Ignoring unreadable option file")
                }
            }
        }

        let mut has_subdirs = false;
        if let Ok(entries) = self.read_entries() {
            for entry in entries {
                let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
                if is_dir {
                    has_subdirs = true;
                } else if entry
                    .file_name()
                    .to_str()
                    .is_some_and(is_schema_file_name::<C>)
                {
                    return true;
                }
            }
        }

        !has_subdirs
    }

    /// True if at least one immediate subdirectory is a leaf.
    ///
    /// Such a directory can map its subdirectories onto the schemas of a
    /// single database server.
    pub fn has_leaf_subdirs(&self) -> bool {
        match self.subdirs() {
            Ok(subdirs) => subdirs.iter().any(PathNode::is_leaf),
            Err(e) => {
                tracing::debug!(dir = %self, error = %e, "Unable to list subdirectories");
                false
            }
        }
    }

    /// Every leaf directory in the tree rooted here, including this one.
    ///
    /// Leaves are not descended into. Dot-directories below this node (for
    /// example `.git`) are neither reported nor entered.
    ///
    /// # Errors
    ///
    /// Returns `Io` if part of the tree cannot be read.
    pub fn leaf_descendants(&self) -> Result<Vec<PathNode<C>>> {
        let mut leaves = Vec::new();
        let mut walker = WalkDir::new(self.path()).follow_links(false).into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(self.path()).to_path_buf();
                DirectoryError::io("walk", path, e.into())
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.') {
                walker.skip_current_dir();
                continue;
            }

            let dir = PathNode::from_clean(entry.path().to_path_buf());
            if dir.is_leaf() {
                tracing::trace!(dir = %dir, "Found leaf directory");
                walker.skip_current_dir();
                leaves.push(dir);
            }
        }

        Ok(leaves)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SqltreeLayout;
    use crate::error::DirectoryError;
    use crate::path_node::PathNode;
    use std::fs;
    use tempfile::TempDir;

    type Dir = PathNode<SqltreeLayout>;

    #[test]
    fn test_schema_key_makes_leaf_despite_subdirs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".sqltree"), "schema=app\n").unwrap();
        fs::create_dir(temp.path().join("child")).unwrap();

        assert!(Dir::new(temp.path()).is_leaf());
    }

    #[test]
    fn test_schema_file_makes_leaf() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("tableA.sql"), "CREATE TABLE tableA (id int);").unwrap();
        fs::create_dir(temp.path().join("child")).unwrap();

        assert!(Dir::new(temp.path()).is_leaf());
    }

    #[test]
    fn test_empty_directory_is_leaf() {
        let temp = TempDir::new().unwrap();
        assert!(Dir::new(temp.path()).is_leaf());
    }

    #[test]
    fn test_file_only_directory_is_leaf() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "docs").unwrap();
        fs::write(temp.path().join(".sqltree"), "host=localhost\n").unwrap();

        assert!(Dir::new(temp.path()).is_leaf());
    }

    #[test]
    fn test_directory_with_only_subdir_is_not_leaf() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("child")).unwrap();

        assert!(!Dir::new(temp.path()).is_leaf());
    }

    #[test]
    fn test_config_without_schema_key_and_subdirs_is_not_leaf() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".sqltree"), "host=localhost\n").unwrap();
        fs::create_dir(temp.path().join("child")).unwrap();

        assert!(!Dir::new(temp.path()).is_leaf());
    }

    #[test]
    fn test_malformed_config_falls_through_to_other_rules() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".sqltree"), "[broken\nschema=app\n").unwrap();
        fs::create_dir(temp.path().join("child")).unwrap();

        assert!(!Dir::new(temp.path()).is_leaf());
    }

    #[test]
    fn test_has_leaf_subdirs() {
        let temp = TempDir::new().unwrap();
        let dir = Dir::new(temp.path());
        assert!(!dir.has_leaf_subdirs());

        fs::create_dir_all(temp.path().join("group").join("inner")).unwrap();
        assert!(!dir.has_leaf_subdirs());

        fs::write(temp.path().join("group").join(".sqltree"), "schema=app\n").unwrap();
        assert!(dir.has_leaf_subdirs());
    }

    #[test]
    fn test_has_leaf_subdirs_with_empty_child() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("app")).unwrap();

        assert!(Dir::new(temp.path()).has_leaf_subdirs());
    }

    #[test]
    fn test_has_leaf_subdirs_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert!(!Dir::new(temp.path().join("missing")).has_leaf_subdirs());
    }

    #[test]
    fn test_leaf_descendants() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("prod").join("app")).unwrap();
        fs::write(root.join("prod").join("app").join("users.sql"), "").unwrap();
        fs::create_dir_all(root.join("prod").join("app").join("archive")).unwrap();
        fs::create_dir_all(root.join("prod").join("billing")).unwrap();
        fs::create_dir_all(root.join(".git").join("objects")).unwrap();

        let mut leaves: Vec<_> = Dir::new(root)
            .leaf_descendants()
            .unwrap()
            .into_iter()
            .map(|d| d.into_path_buf())
            .collect();
        leaves.sort();

        assert_eq!(
            leaves,
            vec![
                root.join("prod").join("app"),
                root.join("prod").join("billing"),
            ]
        );
    }

    #[test]
    fn test_leaf_descendants_of_leaf_is_itself() {
        let temp = TempDir::new().unwrap();
        let dir = Dir::new(temp.path());
        assert_eq!(dir.leaf_descendants().unwrap(), vec![dir.clone()]);
    }

    #[test]
    fn test_leaf_descendants_missing_directory() {
        let temp = TempDir::new().unwrap();
        let dir = Dir::new(temp.path().join("missing"));
        assert!(matches!(
            dir.leaf_descendants(),
            Err(DirectoryError::Io { .. })
        ));
    }
}
