//! File system seam used by [`ConfigStore`](crate::ConfigStore).
//!
//! - [`FsBackend`]: the real file system via `std::fs`.
//! - [`MemoryBackend`]: an in-memory file table for tests, with switches to
//!   simulate read-only files and failing writes.

use std::io;
use std::path::Path;

pub mod fs;
pub mod memory;

pub use fs::FsBackend;
pub use memory::MemoryBackend;

/// File operations needed to load and persist config files.
pub trait FileBackend: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the file contents with `text`, creating it if needed.
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;

    /// Whether a write to `path` is expected to succeed.  A file that does
    /// not exist yet counts as writable.
    fn is_writable(&self, path: &Path) -> bool;

    /// Attempts to make an existing file writable.
    fn set_writable(&self, path: &Path) -> io::Result<()>;
}
