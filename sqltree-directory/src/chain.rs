//! Inherited configuration: the option files of a directory and its ancestors.
//!
//! Ascent starts at the target directory and moves up one level at a time.
//! It stops after examining the user's home directory or a directory that
//! contains the version-control marker, whichever comes first. Ancestors
//! that cannot be listed (typically because they do not exist yet) are
//! skipped. The collected option files are returned root-to-leaf so that
//! applying them in order lets the deepest directory win.

use crate::config::LayoutConfig;
use crate::config_file::ConfigFile;
use crate::error::{DirectoryError, Result};
use crate::path_node::{clean_path, PathNode};
use sqltree_config::Settings;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The directory at which ascent stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AscentBoundary {
    /// The ancestor equal to the user's home directory.
    HomeDirectory(PathBuf),
    /// The ancestor containing the version-control marker.
    RepositoryRoot(PathBuf),
}

impl AscentBoundary {
    /// The boundary directory.
    pub fn path(&self) -> &Path {
        match self {
            Self::HomeDirectory(path) | Self::RepositoryRoot(path) => path,
        }
    }
}

/// Why an ancestor was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorStatus {
    /// The ancestor does not exist.
    Missing,
    /// The ancestor exists but could not be listed.
    Inaccessible(ErrorKind),
}

/// An ancestor that ascent passed over without listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlistedAncestor {
    pub path: PathBuf,
    pub status: AncestorStatus,
}

/// The option files that apply to one directory, root-to-leaf.
///
/// Resolution itself never fails. A file that exists but cannot be loaded is
/// left out of [`files`](Self::files) and reported through
/// [`error`](Self::error); callers that treat that as fatal can use
/// [`into_result`](Self::into_result).
///
/// # Examples
///
/// ```no_run
/// use sqltree_directory::{ConfigChain, SchemaDir};
///
/// let dir = SchemaDir::new("schemas/app");
/// let chain = ConfigChain::resolve_from_env(&dir);
/// let settings = chain.settings(Some("production"));
/// println!("host = {:?}", settings.get("host"));
/// ```
pub struct ConfigChain<C: LayoutConfig> {
    files: Vec<ConfigFile<C>>,
    boundary: Option<AscentBoundary>,
    unlisted: Vec<UnlistedAncestor>,
    error: Option<DirectoryError>,
}

impl<C: LayoutConfig> ConfigChain<C> {
    /// Resolve the chain for `dir`, treating `home` as an ascent boundary.
    pub fn resolve(dir: &PathNode<C>, home: Option<&Path>) -> Self {
        let home = home
            .filter(|h| !h.as_os_str().is_empty())
            .map(|h| clean_path(h).unwrap_or_else(|_| h.to_path_buf()));

        let mut chain = Self {
            files: Vec::new(),
            boundary: None,
            unlisted: Vec::new(),
            error: None,
        };

        for path in ascent_path(dir.path()) {
            if home.as_deref() == Some(path.as_path()) {
                chain.boundary = Some(AscentBoundary::HomeDirectory(path.clone()));
            }
            chain.examine(PathNode::from_clean(path));
            if chain.boundary.is_some() {
                break;
            }
        }

        chain.files.reverse();
        tracing::debug!(
            dir = %dir,
            files = chain.files.len(),
            boundary = ?chain.boundary,
            "Resolved configuration chain"
        );
        chain
    }

    /// Resolve the chain for `dir`, using the current user's home directory.
    pub fn resolve_from_env(dir: &PathNode<C>) -> Self {
        let home = dirs::home_dir();
        Self::resolve(dir, home.as_deref())
    }

    fn examine(&mut self, ancestor: PathNode<C>) {
        let names = match list_names(ancestor.path()) {
            Ok(names) => names,
            Err(e) => {
                let status = if e.kind() == ErrorKind::NotFound {
                    AncestorStatus::Missing
                } else {
                    AncestorStatus::Inaccessible(e.kind())
                };
                tracing::trace!(dir = %ancestor, ?status, "Skipping unlisted ancestor");
                self.unlisted.push(UnlistedAncestor {
                    path: ancestor.into_path_buf(),
                    status,
                });
                return;
            }
        };

        for name in names {
            if name == C::VCS_MARKER {
                tracing::trace!(dir = %ancestor, "Found repository root");
                if self.boundary.is_none() {
                    self.boundary = Some(AscentBoundary::RepositoryRoot(
                        ancestor.path().to_path_buf(),
                    ));
                }
            } else if name == C::CONFIG_FILE_NAME {
                match ConfigFile::load(ancestor.clone()) {
                    Ok(file) => self.files.push(file),
                    Err(e) => {
                        tracing::warn!(dir = %ancestor, error = %e, "Failed to load option file");
                        self.error = Some(e);
                    }
                }
            }
        }
    }

    /// Option files, shallowest first.
    pub fn files(&self) -> &[ConfigFile<C>] {
        &self.files
    }

    /// Consume the chain, returning its option files and ignoring any error.
    pub fn into_files(self) -> Vec<ConfigFile<C>> {
        self.files
    }

    /// The most recent load failure encountered during ascent.
    pub fn error(&self) -> Option<&DirectoryError> {
        self.error.as_ref()
    }

    /// Where ascent stopped, if it stopped before the filesystem root.
    pub fn boundary(&self) -> Option<&AscentBoundary> {
        self.boundary.as_ref()
    }

    /// Ancestors that were skipped because they could not be listed.
    pub fn unlisted(&self) -> &[UnlistedAncestor] {
        &self.unlisted
    }

    /// Merge the chain root-to-leaf, optionally overlaying a named section.
    pub fn settings(&self, section: Option<&str>) -> Settings {
        Settings::from_files(self.files.iter().map(ConfigFile::options), section)
    }

    /// The option files, or the recorded load failure.
    pub fn into_result(self) -> Result<Vec<ConfigFile<C>>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.files),
        }
    }
}

impl<C: LayoutConfig> fmt::Debug for ConfigChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigChain")
            .field("files", &self.files)
            .field("boundary", &self.boundary)
            .field("unlisted", &self.unlisted)
            .field("error", &self.error)
            .finish()
    }
}

impl<C: LayoutConfig> PathNode<C> {
    /// Shorthand for [`ConfigChain::resolve`].
    pub fn config_chain(&self, home: Option<&Path>) -> ConfigChain<C> {
        ConfigChain::resolve(self, home)
    }
}

/// Directories examined during ascent, deepest first.
///
/// The filesystem root is only included when it is the starting point.
fn ascent_path(start: &Path) -> Vec<PathBuf> {
    if start.parent().is_none() {
        return vec![start.to_path_buf()];
    }
    start
        .ancestors()
        .filter(|p| p.parent().is_some())
        .map(Path::to_path_buf)
        .collect()
}

fn list_names(path: &Path) -> std::io::Result<Vec<OsString>> {
    fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect()
}
