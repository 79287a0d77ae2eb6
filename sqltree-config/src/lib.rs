//! Option files for sqltree directories.
//!
//! Every directory in a sqltree may carry a small INI-style option file. This
//! crate parses those files ([`OptionFile`]) and merges a sequence of them in
//! order ([`Settings`]). It attaches no meaning to individual option names;
//! callers only ask whether an option exists and what raw value it holds.
//!
//! ```rust
//! use sqltree_config::{OptionFile, Settings};
//!
//! let repo = OptionFile::parse("/repo/.sqltree", "host=localhost\nport=3306\n")?;
//! let app = OptionFile::parse("/repo/app/.sqltree", "schema=app\nport=3307\n")?;
//!
//! let settings = Settings::from_files([&repo, &app], None);
//! assert_eq!(settings.get("port"), Some("3307"));
//! assert!(app.has_field("schema"));
//! # Ok::<(), sqltree_config::ConfigError>(())
//! ```

mod error;
mod option_file;
mod settings;

pub use error::{ConfigError, Result};
pub use option_file::{normalize_key, OptionFile, Section, MAX_OPTION_FILE_SIZE};
pub use settings::{SettingValue, Settings};
