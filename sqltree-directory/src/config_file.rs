//! The option file belonging to one directory.

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::path_node::PathNode;
use sqltree_config::OptionFile;
use std::fmt;
use std::path::Path;

/// A directory's parsed option file.
///
/// Never mutated after loading. Chains of these are merged by applying them
/// in order, see [`ConfigChain::settings`](crate::ConfigChain::settings).
pub struct ConfigFile<C: LayoutConfig> {
    dir: PathNode<C>,
    options: OptionFile,
}

impl<C: LayoutConfig> ConfigFile<C> {
    /// Load the option file of `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file is missing, unreadable or malformed.
    pub fn load(dir: PathNode<C>) -> Result<Self> {
        let options = OptionFile::read(dir.config_file_path())?;
        Ok(Self { dir, options })
    }

    /// The directory this file was read from.
    pub fn dir(&self) -> &PathNode<C> {
        &self.dir
    }

    /// Full path of the option file.
    pub fn path(&self) -> &Path {
        self.options.path()
    }

    /// The parsed options.
    pub fn options(&self) -> &OptionFile {
        &self.options
    }

    /// True if the file sets `key` outside any section.
    pub fn has_field(&self, key: &str) -> bool {
        self.options.has_field(key)
    }

    /// True if the file marks its directory as a single schema.
    pub fn declares_schema(&self) -> bool {
        self.has_field(C::SCHEMA_KEY)
    }
}

impl<C: LayoutConfig> Clone for ConfigFile<C> {
    fn clone(&self) -> Self {
        Self {
            dir: self.dir.clone(),
            options: self.options.clone(),
        }
    }
}

impl<C: LayoutConfig> fmt::Debug for ConfigFile<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigFile")
            .field("dir", &self.dir)
            .field("options", &self.options)
            .finish()
    }
}

impl<C: LayoutConfig> PathNode<C> {
    /// Load this directory's own option file, ignoring ancestors.
    pub fn config_file(&self) -> Result<ConfigFile<C>> {
        ConfigFile::load(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SqltreeLayout;
    use crate::error::DirectoryError;
    use crate::path_node::PathNode;
    use sqltree_config::ConfigError;
    use std::fs;
    use tempfile::TempDir;

    type Dir = PathNode<SqltreeLayout>;

    #[test]
    fn test_load_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".sqltree"), "schema=app\nhost=localhost\n").unwrap();

        let dir = Dir::new(temp.path());
        let file = dir.config_file().unwrap();
        assert_eq!(file.dir(), &dir);
        assert_eq!(file.path(), temp.path().join(".sqltree"));
        assert!(file.has_field("host"));
        assert!(file.declares_schema());
        assert_eq!(file.options().value("schema"), Some("app"));
    }

    #[test]
    fn test_schema_in_section_is_not_declared() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".sqltree"), "[production]\nschema=app\n").unwrap();

        let file = Dir::new(temp.path()).config_file().unwrap();
        assert!(!file.declares_schema());
    }

    #[test]
    fn test_missing_config_file() {
        let temp = TempDir::new().unwrap();
        match Dir::new(temp.path()).config_file() {
            Err(DirectoryError::Config(err)) => assert!(err.is_not_found()),
            other => panic!("expected missing file error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".sqltree"), "[broken\n").unwrap();

        assert!(matches!(
            Dir::new(temp.path()).config_file(),
            Err(DirectoryError::Config(ConfigError::Parse { .. }))
        ));
    }
}
