//! Test utilities for sqltree crates
//!
//! Tests build schema trees inside temporary directories and sometimes need
//! the home directory to point somewhere predictable, because the home
//! directory is an ascent boundary for configuration inheritance.
//!
//! ## Usage
//!
//! ```no_run
//! use sqltree_test_utils::IsolatedTestEnvironment;
//!
//! #[test]
//! #[serial_test::serial]
//! fn test_something() {
//!     let env = IsolatedTestEnvironment::new().unwrap();
//!     env.write_config("repo", "host=localhost\n").unwrap();
//!     env.write_file("repo/app/users.sql", "CREATE TABLE users (id int);").unwrap();
//!     // HOME is restored when `env` is dropped
//! }
//! ```
//!
//! Tests that create an `IsolatedTestEnvironment` change process-wide state
//! and should be marked `#[serial]`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the option file written by [`IsolatedTestEnvironment::write_config`].
pub const CONFIG_FILE_NAME: &str = ".sqltree";

/// RAII guard for an isolated HOME directory
///
/// Creates a temporary directory, points HOME at it, and restores the
/// original HOME on drop.
pub struct IsolatedTestEnvironment {
    temp_dir: TempDir,
    original_home: Option<String>,
}

impl IsolatedTestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> io::Result<Self> {
        let temp_dir = create_temp_dir_with_retry()?;
        let original_home = std::env::var("HOME").ok();
        std::env::set_var("HOME", temp_dir.path());

        Ok(Self {
            temp_dir,
            original_home,
        })
    }

    /// Path of the isolated home directory
    pub fn home_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path for `relative` inside the isolated home
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.home_path().join(relative)
    }

    /// Create a directory (and its parents) inside the isolated home
    pub fn mkdir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.path(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write a file inside the isolated home, creating parent directories
    pub fn write_file(
        &self,
        relative: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) -> io::Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write the option file of the directory `relative_dir`
    pub fn write_config(
        &self,
        relative_dir: impl AsRef<Path>,
        contents: &str,
    ) -> io::Result<PathBuf> {
        self.write_file(relative_dir.as_ref().join(CONFIG_FILE_NAME), contents)
    }
}

impl Drop for IsolatedTestEnvironment {
    fn drop(&mut self) {
        match &self.original_home {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
    }
}

/// Create a temporary directory with retry logic for parallel test execution
pub fn create_temp_dir_with_retry() -> io::Result<TempDir> {
    let mut attempt = 1;
    loop {
        match TempDir::new() {
            Ok(dir) => return Ok(dir),
            Err(_) if attempt < 3 => {
                std::thread::sleep(std::time::Duration::from_millis(10 * attempt));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
