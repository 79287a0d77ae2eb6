//! Directory hierarchy resolution for schema-as-code trees.
//!
//! A sqltree maps a filesystem tree onto database schemas. Each directory
//! either holds one schema (a *leaf*) or groups other directories, and each
//! may carry an option file whose settings are inherited by the directories
//! below it. This crate locates and orders those directories and files; it
//! does not interpret schema files or option values.
//!
//! # Overview
//!
//! - [`PathNode`] - an immutable, cleaned absolute directory path
//! - [`SchemaFile`] - a `*.sql` file found directly inside a directory
//! - [`ConfigFile`] - one directory's parsed option file
//! - [`ConfigChain`] - the option files inherited by a directory, root-to-leaf
//! - [`LayoutConfig`] - the file and marker names the resolution looks for
//!
//! # Example
//!
//! ```no_run
//! use sqltree_directory::{ConfigChain, SchemaDir};
//!
//! let root = SchemaDir::new("schemas");
//! for leaf in root.leaf_descendants()? {
//!     let chain = ConfigChain::resolve_from_env(&leaf);
//!     let settings = chain.settings(None);
//!     println!("{leaf}: schema={:?}", settings.get("schema"));
//!
//!     for file in leaf.schema_files()? {
//!         if let Some(err) = file.error() {
//!             eprintln!("{}: {err}", file.path().display());
//!         }
//!     }
//! }
//! # Ok::<(), sqltree_directory::DirectoryError>(())
//! ```

mod chain;
mod config;
mod config_file;
mod error;
mod leaf;
mod path_node;
mod schema_file;
mod subdirs;

pub use chain::{AncestorStatus, AscentBoundary, ConfigChain, UnlistedAncestor};
pub use config::{LayoutConfig, SqltreeLayout};
pub use config_file::ConfigFile;
pub use error::{DirectoryError, Result};
pub use path_node::{clean_path, PathNode};
pub use schema_file::{is_schema_file_name, SchemaFile, MAX_SCHEMA_FILE_SIZE};

pub use sqltree_config::{OptionFile, Settings};

/// A directory using the default `.sqltree` layout.
pub type SchemaDir = PathNode<SqltreeLayout>;
