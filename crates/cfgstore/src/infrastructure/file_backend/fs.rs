//! [`FileBackend`] over the real file system.

use std::io;
use std::path::Path;

use tracing::debug;

use super::FileBackend;

/// `std::fs` backed implementation.  Parent directories are created on
/// write.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl FileBackend for FsBackend {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, text)
    }

    fn is_writable(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => !meta.permissions().readonly(),
            Err(e) => e.kind() == io::ErrorKind::NotFound,
        }
    }

    fn set_writable(&self, path: &Path) -> io::Result<()> {
        let mut permissions = std::fs::metadata(path)?.permissions();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            permissions.set_mode(permissions.mode() | 0o200);
        }

        #[cfg(not(unix))]
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);

        debug!(file = %path.display(), "marking config file writable");
        std::fs::set_permissions(path, permissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cfgstore_fs_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_write_creates_parent_directories() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("nested").join("deeper").join("config.php");

        // Act
        FsBackend::new().write(&path, "<?php return [];").expect("write");

        // Assert
        assert!(FsBackend::new().exists(&path));
        assert_eq!(FsBackend::new().read(&path).unwrap(), b"<?php return [];");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_does_not_exist_but_is_writable() {
        let backend = FsBackend::new();
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.php");
        assert!(!backend.exists(&path));
        assert!(backend.is_writable(&path));
        assert!(backend.read(&path).is_err());
    }

    #[test]
    fn test_directory_is_not_an_existing_file() {
        let dir = temp_dir();
        assert!(!FsBackend::new().exists(&dir));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_writable_clears_read_only_flag() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("config.php");
        std::fs::write(&path, "x").unwrap();
        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&path, permissions).unwrap();
        let backend = FsBackend::new();
        assert!(!backend.is_writable(&path));

        // Act
        backend.set_writable(&path).expect("set_writable");

        // Assert
        assert!(backend.is_writable(&path));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_writable_on_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.php");
        assert!(FsBackend::new().set_writable(&path).is_err());
    }
}
