//! A single directory location in a schema tree.
//!
//! `PathNode<C>` is an immutable, lexically cleaned absolute path. Operations
//! that would "move" to another directory (parent, children) return new
//! instances; the struct itself never changes after construction.

use crate::config::LayoutConfig;
use crate::error::{DirectoryError, Result};
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Component, Path, PathBuf};

/// A directory in a schema tree, which need not exist yet.
///
/// Equality and hashing consider only the path.
///
/// # Examples
///
/// ```no_run
/// use sqltree_directory::SchemaDir;
///
/// let dir = SchemaDir::new("schemas/../schemas/./app");
/// if dir.create_if_missing()? {
///     println!("created {dir}");
/// }
/// assert_eq!(dir.parent().path().file_name().unwrap(), "schemas");
/// # Ok::<(), sqltree_directory::DirectoryError>(())
/// ```
pub struct PathNode<C: LayoutConfig> {
    path: PathBuf,
    _layout: PhantomData<fn() -> C>,
}

impl<C: LayoutConfig> PathNode<C> {
    /// Build a node from a raw path.
    ///
    /// Relative paths are resolved against the current directory and the
    /// result is cleaned lexically. If the current directory is unavailable
    /// the raw path is kept as given.
    pub fn new(raw: impl AsRef<Path>) -> Self {
        let raw = raw.as_ref();
        let path = match clean_path(raw) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                tracing::debug!(
                    path = %raw.display(),
                    error = %e,
                    "Unable to canonicalize path, using it unchanged"
                );
                raw.to_path_buf()
            }
        };
        Self::from_clean(path)
    }

    /// Wrap a path that is already absolute and clean.
    pub(crate) fn from_clean(path: PathBuf) -> Self {
        Self {
            path,
            _layout: PhantomData,
        }
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the node, returning its path.
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }

    /// Node for `name` relative to this directory. The result need not exist.
    ///
    /// A leading root or prefix in `name` is ignored, so an absolute `name`
    /// still resolves below this directory.
    pub fn join(&self, name: impl AsRef<Path>) -> Self {
        let relative: PathBuf = name
            .as_ref()
            .components()
            .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
            .collect();
        Self::new(self.path.join(relative))
    }

    /// Path of this directory's option file, whether or not it exists.
    pub fn config_file_path(&self) -> PathBuf {
        self.path.join(C::CONFIG_FILE_NAME)
    }

    /// True if this node is the filesystem root.
    pub fn is_root(&self) -> bool {
        self.path.parent().is_none()
    }

    /// Create the directory unless it already exists.
    ///
    /// Returns `Ok(true)` if the directory was created and `Ok(false)` if it
    /// was already present.
    ///
    /// # Errors
    ///
    /// Returns `PathConflict` if the path exists but is not a directory, and
    /// `Io` if the path cannot be inspected or created.
    pub fn create_if_missing(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(metadata) if metadata.is_dir() => return Ok(false),
            Ok(_) => return Err(DirectoryError::path_conflict(&self.path)),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(DirectoryError::io("use directory", &self.path, e)),
        }

        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o777);
        }
        builder
            .create(&self.path)
            .map_err(|e| DirectoryError::io("create directory", &self.path, e))?;

        tracing::debug!(path = %self.path.display(), "Created directory");
        Ok(true)
    }

    /// Remove the directory and everything below it.
    ///
    /// A missing path is not an error.
    pub fn delete(&self) -> Result<()> {
        let result = match fs::symlink_metadata(&self.path) {
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(&self.path),
            Ok(_) => fs::remove_file(&self.path),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Deleted directory");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DirectoryError::io("delete", &self.path, e)),
        }
    }

    /// True if an entry called `name` exists directly inside this directory.
    ///
    /// Only existence is checked; the entry may be of any type.
    pub fn has_file(&self, name: &str) -> bool {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(entry)), None) => self.path.join(entry).exists(),
            _ => false,
        }
    }

    /// True if this directory contains its option file.
    pub fn has_config_file(&self) -> bool {
        self.has_file(C::CONFIG_FILE_NAME)
    }

    /// The immediate parent. The filesystem root is its own parent.
    pub fn parent(&self) -> Self {
        match self.path.parent() {
            Some(parent) => Self::from_clean(parent.to_path_buf()),
            None => self.clone(),
        }
    }
}

impl<C: LayoutConfig> Clone for PathNode<C> {
    fn clone(&self) -> Self {
        Self::from_clean(self.path.clone())
    }
}

impl<C: LayoutConfig> fmt::Debug for PathNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathNode").field(&self.path).finish()
    }
}

impl<C: LayoutConfig> fmt::Display for PathNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl<C: LayoutConfig> PartialEq for PathNode<C> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<C: LayoutConfig> Eq for PathNode<C> {}

impl<C: LayoutConfig> Hash for PathNode<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl<C: LayoutConfig> AsRef<Path> for PathNode<C> {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Make `raw` absolute and remove `.` and `..` components lexically.
///
/// Symlinks are not resolved. Fails only if `raw` is relative and the
/// current directory cannot be determined.
pub fn clean_path(raw: &Path) -> std::io::Result<PathBuf> {
    let absolute = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        std::env::current_dir()?.join(raw)
    };
    Ok(lexical_clean(&absolute))
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => cleaned.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) {
                    cleaned.pop();
                }
            }
            Component::Normal(part) => cleaned.push(part),
        }
    }
    cleaned
}
