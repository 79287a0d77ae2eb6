//! Ordered merging of option files.
//!
//! Files are applied one after another; whichever file sets a key last wins.
//! Directory chains are applied root-to-leaf so the most specific directory
//! overrides its ancestors.

use crate::option_file::{normalize_key, OptionFile, Section};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One merged option together with the file that supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingValue {
    /// Raw value; `None` for a bare flag.
    pub value: Option<String>,
    /// Option file the winning value came from.
    pub source: PathBuf,
}

/// The result of applying a sequence of option files in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    values: IndexMap<String, SettingValue>,
}

impl Settings {
    /// Create an empty set of settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `files` in iteration order.
    ///
    /// For each file the default section is applied first, then `section` if
    /// the file declares it.
    pub fn from_files<'a, I>(files: I, section: Option<&str>) -> Self
    where
        I: IntoIterator<Item = &'a OptionFile>,
    {
        let mut settings = Self::new();
        for file in files {
            settings.apply(file, section);
        }
        settings
    }

    /// Apply one option file on top of the current values.
    pub fn apply(&mut self, file: &OptionFile, section: Option<&str>) {
        self.apply_section(file.path(), file.default_section());
        if let Some(name) = section {
            if let Some(named) = file.section(name) {
                self.apply_section(file.path(), named);
            }
        }
    }

    fn apply_section(&mut self, source: &Path, section: &Section) {
        for (key, value) in section {
            let previous = self.values.insert(
                key.clone(),
                SettingValue {
                    value: value.clone(),
                    source: source.to_path_buf(),
                },
            );
            if let Some(previous) = previous {
                tracing::trace!(
                    key = %key,
                    from = %previous.source.display(),
                    to = %source.display(),
                    "Option overridden"
                );
            }
        }
    }

    /// True if any applied file set `key`.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(&normalize_key(key))
    }

    /// Winning value of `key`, if it has one.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .and_then(|v| v.value.as_deref())
    }

    /// Path of the option file that supplied the winning value of `key`.
    pub fn source_of(&self, key: &str) -> Option<&Path> {
        self.values
            .get(&normalize_key(key))
            .map(|v| v.source.as_path())
    }

    /// Number of distinct options set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no option is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate merged options in first-set order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, contents: &str) -> OptionFile {
        OptionFile::parse(path, contents).unwrap()
    }

    #[test]
    fn test_later_files_win() {
        let repo = file("/repo/.sqltree", "host=localhost\nport=3306\n");
        let schema = file("/repo/app/.sqltree", "schema=app\nport=3307\n");

        let settings = Settings::from_files([&repo, &schema], None);
        assert_eq!(settings.get("host"), Some("localhost"));
        assert_eq!(settings.get("port"), Some("3307"));
        assert_eq!(settings.get("schema"), Some("app"));
        assert_eq!(
            settings.source_of("port"),
            Some(Path::new("/repo/app/.sqltree"))
        );
        assert_eq!(settings.source_of("host"), Some(Path::new("/repo/.sqltree")));
        assert_eq!(settings.len(), 3);
    }

    #[test]
    fn test_named_section_overrides_default_within_file() {
        let repo = file(
            "/repo/.sqltree",
            "host=localhost\n[production]\nhost=db.prod\n",
        );

        let dev = Settings::from_files([&repo], None);
        assert_eq!(dev.get("host"), Some("localhost"));

        let prod = Settings::from_files([&repo], Some("production"));
        assert_eq!(prod.get("host"), Some("db.prod"));
    }

    #[test]
    fn test_deeper_default_beats_shallower_section() {
        let repo = file("/repo/.sqltree", "[production]\nhost=db.prod\n");
        let schema = file("/repo/app/.sqltree", "host=app.prod\n");

        let settings = Settings::from_files([&repo, &schema], Some("production"));
        assert_eq!(settings.get("host"), Some("app.prod"));
    }

    #[test]
    fn test_flags_are_set_without_value() {
        let repo = file("/repo/.sqltree", "allow-unsafe\n");
        let settings = Settings::from_files([&repo], None);
        assert!(settings.is_set("allow_unsafe"));
        assert_eq!(settings.get("allow-unsafe"), None);
    }

    #[test]
    fn test_empty() {
        let settings = Settings::new();
        assert!(settings.is_empty());
        assert!(!settings.is_set("schema"));
        assert_eq!(settings.iter().count(), 0);
    }
}
