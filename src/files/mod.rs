//! File system access for snekcheck
//!
//! The linter never touches `std::fs` directly. It goes through the
//! [`FileSystem`] trait so traversal can be exercised against an in-memory
//! tree in tests and against the real disk in the CLI.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

mod memory;
mod path;
pub mod walk;

pub use memory::MemoryFileSystem;
pub use path::TreePath;
pub use walk::{TraversalEntry, TreeWalk, Walk, walk};

/// Metadata for one file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Size in bytes (zero for directories)
    pub len: u64,
}

impl FileStat {
    pub fn dir() -> Self {
        Self { is_dir: true, len: 0 }
    }

    pub fn file(len: u64) -> Self {
        Self { is_dir: false, len }
    }
}

/// The file system operations the linter needs
pub trait FileSystem {
    /// Stats an entry without following symbolic links.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Lists the names of a directory's direct entries, in no particular order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>>;

    /// Renames an entry.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Opens a file for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
}

/// The host operating system's file system
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = fs::symlink_metadata(path)?;
        Ok(FileStat {
            is_dir: metadata.is_dir(),
            len: metadata.len(),
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        fs::read_dir(path)?
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(path)?))
    }
}
