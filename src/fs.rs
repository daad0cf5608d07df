//! Filesystem access for `config.toml`.
//!
//! [`ConfigManager`](crate::config::manager::ConfigManager) is generic over
//! [`FileSystem`] so its load, save and validation paths can be tested
//! against an in-memory map. The binary always uses [`OsFileSystem`].

use std::io;
use std::path::Path;

pub trait FileSystem {
    /// Reads the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replaces the config file with `contents`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Creates the config directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// A missing config file means defaults, not an error.
    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_all(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
