//! In-memory [`FileBackend`] for tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::FileBackend;

#[derive(Default)]
struct State {
    files: HashMap<PathBuf, Vec<u8>>,
    read_only: HashSet<PathBuf>,
    fail_writes: bool,
    locked_permissions: bool,
    writes: usize,
}

/// File table kept in memory.
///
/// - [`set_read_only`](Self::set_read_only) marks a path as not writable;
///   `set_writable` clears the mark unless permission changes are locked.
/// - [`fail_writes`](Self::fail_writes) makes every `write` return an error.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with `contents`.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.with_state(|s| {
            s.files.insert(path.into(), contents.into());
        });
    }

    /// Returns the file contents as text, if present and valid UTF-8.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.with_state(|s| s.files.get(path).cloned())
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    pub fn set_read_only(&self, path: impl Into<PathBuf>, read_only: bool) {
        let path = path.into();
        self.with_state(|s| {
            if read_only {
                s.read_only.insert(path);
            } else {
                s.read_only.remove(&path);
            }
        });
    }

    /// Makes `set_writable` fail, so read-only marks stay in place.
    pub fn lock_permissions(&self, locked: bool) {
        self.with_state(|s| s.locked_permissions = locked);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.with_state(|s| s.fail_writes = fail);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.with_state(|s| s.writes)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl FileBackend for MemoryBackend {
    fn exists(&self, path: &Path) -> bool {
        self.with_state(|s| s.files.contains_key(path))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.with_state(|s| s.files.get(path).cloned()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        self.with_state(|s| {
            if s.fail_writes {
                return Err(io::Error::other("simulated write failure"));
            }
            if s.read_only.contains(path) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("{} is read-only", path.display()),
                ));
            }
            s.files.insert(path.to_path_buf(), text.as_bytes().to_vec());
            s.writes += 1;
            Ok(())
        })
    }

    fn is_writable(&self, path: &Path) -> bool {
        self.with_state(|s| !s.read_only.contains(path))
    }

    fn set_writable(&self, path: &Path) -> io::Result<()> {
        self.with_state(|s| {
            if s.locked_permissions {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "permission changes are locked",
                ));
            }
            s.read_only.remove(path);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_file_is_readable() {
        let backend = MemoryBackend::new().with_file("config/a.php", "hello");
        assert!(backend.exists(Path::new("config/a.php")));
        assert_eq!(backend.read(Path::new("config/a.php")).unwrap(), b"hello");
    }

    #[test]
    fn test_read_of_missing_file_is_not_found() {
        let err = MemoryBackend::new().read(Path::new("nope.php")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_write_then_contents() {
        let backend = MemoryBackend::new();
        backend.write(Path::new("a.php"), "text").unwrap();
        assert_eq!(backend.contents(Path::new("a.php")).as_deref(), Some("text"));
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn test_read_only_blocks_write_until_set_writable() {
        // Arrange
        let backend = MemoryBackend::new();
        let path = Path::new("a.php");
        backend.set_read_only(path, true);

        // Act / Assert
        assert!(!backend.is_writable(path));
        assert!(backend.write(path, "x").is_err());
        backend.set_writable(path).unwrap();
        assert!(backend.is_writable(path));
        assert!(backend.write(path, "x").is_ok());
    }

    #[test]
    fn test_locked_permissions_keep_file_read_only() {
        let backend = MemoryBackend::new();
        let path = Path::new("a.php");
        backend.set_read_only(path, true);
        backend.lock_permissions(true);
        assert!(backend.set_writable(path).is_err());
        assert!(!backend.is_writable(path));
    }

    #[test]
    fn test_fail_writes_injects_error() {
        let backend = MemoryBackend::new();
        backend.fail_writes(true);
        assert!(backend.write(Path::new("a.php"), "x").is_err());
        assert_eq!(backend.write_count(), 0);
    }
}
