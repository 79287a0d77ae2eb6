//! Parser for the INI-style option files kept in sqltree directories.
//!
//! The format is deliberately small: `key=value` pairs, bare `key` flags,
//! `[section]` headers and `#`/`;` comment lines. Keys are normalized so that
//! `Default_Character_Set` and `default-character-set` name the same option.

use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum option file size to load (10MB).
pub const MAX_OPTION_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Options of one section, in file order. A bare flag has no value.
pub type Section = IndexMap<String, Option<String>>;

/// A parsed option file.
///
/// The default section (options before any `[header]`) is always present,
/// even when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionFile {
    path: PathBuf,
    default: Section,
    sections: IndexMap<String, Section>,
}

impl OptionFile {
    /// Read and parse the option file at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| ConfigError::file_read(path, e))?;
        if metadata.len() > MAX_OPTION_FILE_SIZE {
            return Err(ConfigError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: MAX_OPTION_FILE_SIZE,
            });
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::file_read(path, e))?;
        let file = Self::parse(path, &contents)?;
        tracing::trace!(
            path = %path.display(),
            options = file.default.len(),
            sections = file.sections.len(),
            "Parsed option file"
        );
        Ok(file)
    }

    /// Parse option file `contents`, attributing errors to `path`.
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Result<Self> {
        let path = path.into();
        let mut default = Section::new();
        let mut sections: IndexMap<String, Section> = IndexMap::new();
        let mut current: Option<String> = None;

        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
        for (idx, raw_line) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let (name, trailer) = rest.split_once(']').ok_or_else(|| {
                    ConfigError::parse(&path, line_no, "unterminated section header")
                })?;
                let trailer = trailer.trim();
                if !(trailer.is_empty() || trailer.starts_with('#') || trailer.starts_with(';')) {
                    return Err(ConfigError::parse(
                        &path,
                        line_no,
                        "unexpected text after section header",
                    ));
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(ConfigError::parse(&path, line_no, "empty section name"));
                }
                sections.entry(name.to_string()).or_default();
                current = Some(name.to_string());
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key, Some(parse_value(value))),
                None => (line, None),
            };
            let key = normalize_key(key);
            if key.is_empty() {
                return Err(ConfigError::parse(&path, line_no, "empty option name"));
            }

            let section = match &current {
                Some(name) => sections.entry(name.clone()).or_default(),
                None => &mut default,
            };
            section.insert(key, value);
        }

        Ok(Self {
            path,
            default,
            sections,
        })
    }

    /// Path the file was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the default section sets `key`, with or without a value.
    pub fn has_field(&self, key: &str) -> bool {
        self.default.contains_key(&normalize_key(key))
    }

    /// True if the named section sets `key`.
    pub fn has_field_in(&self, section: &str, key: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|s| s.contains_key(&normalize_key(key)))
    }

    /// Raw entry for `key` in the default section. `Some(None)` means a bare flag.
    pub fn raw(&self, key: &str) -> Option<Option<&str>> {
        self.default.get(&normalize_key(key)).map(|v| v.as_deref())
    }

    /// Value of `key` in the default section, if it was given one.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.raw(key).flatten()
    }

    /// Value of `key` in the named section, if it was given one.
    pub fn value_in(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(&normalize_key(key)))
            .and_then(|v| v.as_deref())
    }

    /// Options outside any section header.
    pub fn default_section(&self) -> &Section {
        &self.default
    }

    /// A named section, if the file declares it.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Names of declared sections, in file order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// Normalize an option name: trimmed, lowercase, underscores as dashes.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn parse_value(raw: &str) -> String {
    let value = raw.trim();
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return value[1..value.len() - 1].to_string();
        }
    }
    strip_trailing_comment(value).to_string()
}

fn strip_trailing_comment(value: &str) -> &str {
    let mut after_whitespace = false;
    for (idx, c) in value.char_indices() {
        if c == '#' && after_whitespace {
            return value[..idx].trim_end();
        }
        after_whitespace = c.is_whitespace();
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
# top-level options
host=127.0.0.1
port = 3306
schema=product
Default_Character_Set=utf8mb4
allow-unsafe

[production]
host = db.prod.internal   # primary
password="p#ss word"
"#;

    #[test]
    fn test_parse_default_section() {
        let file = OptionFile::parse("/repo/.sqltree", SAMPLE).unwrap();
        assert_eq!(file.value("host"), Some("127.0.0.1"));
        assert_eq!(file.value("port"), Some("3306"));
        assert!(file.has_field("schema"));
        assert!(!file.has_field("password"));
    }

    #[test]
    fn test_keys_are_normalized() {
        let file = OptionFile::parse("/repo/.sqltree", SAMPLE).unwrap();
        assert_eq!(file.value("default-character-set"), Some("utf8mb4"));
        assert_eq!(file.value("DEFAULT_CHARACTER_SET"), Some("utf8mb4"));
    }

    #[test]
    fn test_bare_flag() {
        let file = OptionFile::parse("/repo/.sqltree", SAMPLE).unwrap();
        assert!(file.has_field("allow-unsafe"));
        assert_eq!(file.raw("allow-unsafe"), Some(None));
        assert_eq!(file.value("allow-unsafe"), None);
        assert_eq!(file.raw("missing"), None);
    }

    #[test]
    fn test_named_section() {
        let file = OptionFile::parse("/repo/.sqltree", SAMPLE).unwrap();
        assert_eq!(file.section_names().collect::<Vec<_>>(), vec!["production"]);
        assert_eq!(
            file.value_in("production", "host"),
            Some("db.prod.internal")
        );
        assert_eq!(file.value_in("production", "password"), Some("p#ss word"));
        assert!(file.has_field_in("production", "password"));
        assert!(!file.has_field_in("staging", "host"));
    }

    #[test]
    fn test_later_key_overrides_earlier() {
        let file = OptionFile::parse("/x", "schema=a\nschema=b\n").unwrap();
        assert_eq!(file.value("schema"), Some("b"));
        assert_eq!(file.default_section().len(), 1);
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let file = OptionFile::parse("/x", "\u{feff}schema=app\nhost=localhost\n").unwrap();
        assert!(file.has_field("schema"));
        assert_eq!(file.value("schema"), Some("app"));
    }

    #[test]
    fn test_hash_without_whitespace_is_kept() {
        let file = OptionFile::parse("/x", "flavor=mysql#8.0\n").unwrap();
        assert_eq!(file.value("flavor"), Some("mysql#8.0"));
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = OptionFile::parse("/x", "host=a\n=oops\n").unwrap_err();
        match err {
            ConfigError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            OptionFile::parse("/x", "[production\n"),
            Err(ConfigError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            OptionFile::parse("/x", "[ ]\n"),
            Err(ConfigError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_read_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".sqltree");
        fs::write(&path, "schema=inventory\n").unwrap();

        let file = OptionFile::read(&path).unwrap();
        assert_eq!(file.path(), path.as_path());
        assert_eq!(file.value("schema"), Some("inventory"));
    }

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = OptionFile::read(temp.path().join(".sqltree")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_serializes_to_json() {
        let file = OptionFile::parse("/repo/.sqltree", "schema=app\n").unwrap();
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["default"]["schema"], "app");
    }
}
