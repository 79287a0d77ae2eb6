//! Filesystem conventions for sqltree directories.
//!
//! This module provides the `LayoutConfig` trait which names the files and
//! markers the hierarchy resolution looks for.

/// Naming conventions for a schema directory tree.
///
/// # Example
///
/// ```rust
/// use sqltree_directory::{LayoutConfig, PathNode};
///
/// pub struct LegacyLayout;
///
/// impl LayoutConfig for LegacyLayout {
///     const CONFIG_FILE_NAME: &'static str = ".skeema";
/// }
///
/// let dir = PathNode::<LegacyLayout>::new("/srv/schemas");
/// assert_eq!(dir.config_file_path(), std::path::Path::new("/srv/schemas/.skeema"));
/// ```
pub trait LayoutConfig: Send + Sync {
    /// Name of the per-directory option file.
    const CONFIG_FILE_NAME: &'static str;

    /// Entry whose presence marks a version-control root. Ascent stops there.
    const VCS_MARKER: &'static str = ".git";

    /// File extension (without the dot) of schema-definition files.
    const SCHEMA_EXTENSION: &'static str = "sql";

    /// Option that declares a directory to be a single schema.
    const SCHEMA_KEY: &'static str = "schema";
}

/// Default conventions: `.sqltree` option files and `*.sql` schema files.
#[derive(Debug, Clone, Copy)]
pub struct SqltreeLayout;

impl LayoutConfig for SqltreeLayout {
    const CONFIG_FILE_NAME: &'static str = ".sqltree";
}
