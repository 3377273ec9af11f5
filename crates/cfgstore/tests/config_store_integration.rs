//! Integration tests for [`ConfigStore`].
//!
//! Collaborator interaction (call order, which calls happen at all) is
//! verified with `mockall` mocks of the cache and file backend seams.  The
//! end-to-end tests run against the real file system in a unique temp
//! directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cfgstore::{
    ConfigCache, ConfigDocument, ConfigStore, ConfigValue, FileBackend, FsBackend, MemoryCache,
    StoreError, StoreSettings,
};
use mockall::{mock, Sequence};
use uuid::Uuid;

mock! {
    pub Cache {}

    impl ConfigCache for Cache {
        fn fetch(&self, key: &str) -> Option<ConfigDocument>;
        fn save(&self, key: &str, document: &ConfigDocument, ttl: Duration);
        fn delete(&self, key: &str);
    }
}

mock! {
    pub Files {}

    impl FileBackend for Files {
        fn exists(&self, path: &Path) -> bool;
        fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
        fn write(&self, path: &Path, text: &str) -> io::Result<()>;
        fn is_writable(&self, path: &Path) -> bool;
        fn set_writable(&self, path: &Path) -> io::Result<()>;
    }
}

fn config_path() -> PathBuf {
    PathBuf::from("config").join("config.php")
}

fn temp_config_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cfgstore_it_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("temp dir must be creatable");
    dir
}

// ── Collaborator interaction ──────────────────────────────────────────────────

#[test]
fn test_save_deletes_cache_entry_before_writing_file() {
    // Arrange
    let mut seq = Sequence::new();

    let mut cache = MockCache::new();
    cache.expect_fetch().returning(|_| None);
    cache
        .expect_delete()
        .withf(|key| key == "config.php")
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());

    let mut files = MockFiles::new();
    files.expect_exists().return_const(false);
    files.expect_is_writable().return_const(true);
    files
        .expect_write()
        .withf(|path, text| path == config_path().as_path() && text.contains("return ["))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let mut store = ConfigStore::new(
        StoreSettings::default(),
        Some(Arc::new(cache)),
        Arc::new(files),
    );
    store.set("db.host", "localhost");

    // Act
    let result = store.save();

    // Assert – mock expectations are verified on drop
    assert!(result.is_ok());
}

#[test]
fn test_cache_hit_does_not_touch_backend() {
    // Arrange
    let cached: ConfigDocument = [("x", 1)].into_iter().collect();
    let expected = cached.clone();

    let mut cache = MockCache::new();
    cache.expect_fetch().returning(move |key| {
        if key == "config.ext" {
            Some(cached.clone())
        } else {
            None
        }
    });

    let mut files = MockFiles::new();
    files
        .expect_exists()
        .withf(|path| path == config_path().as_path())
        .times(1)
        .return_const(false);
    files.expect_read().never();

    let store = ConfigStore::new(
        StoreSettings::default(),
        Some(Arc::new(cache)),
        Arc::new(files),
    );

    // Act
    let loaded = store.load("config.ext", true);

    // Assert
    assert_eq!(loaded, expected);
}

#[test]
fn test_empty_file_result_is_never_cached() {
    // Arrange
    let mut cache = MockCache::new();
    cache.expect_fetch().returning(|_| None);
    cache.expect_save().never();

    let mut files = MockFiles::new();
    files.expect_exists().return_const(true);
    files
        .expect_read()
        .returning(|_| Ok(b"<?php return [];".to_vec()));

    // Act
    let store = ConfigStore::new(
        StoreSettings::default(),
        Some(Arc::new(cache)),
        Arc::new(files),
    );

    // Assert
    assert!(store.document().is_empty());
}

#[test]
fn test_non_empty_file_result_is_cached_with_configured_ttl() {
    // Arrange
    let mut cache = MockCache::new();
    cache.expect_fetch().returning(|_| None);
    cache
        .expect_save()
        .withf(|key, document, ttl| {
            key == "config.php" && document.len() == 1 && *ttl == Duration::from_secs(90)
        })
        .times(1)
        .return_const(());

    let mut files = MockFiles::new();
    files.expect_exists().return_const(true);
    files
        .expect_read()
        .returning(|_| Ok(b"<?php return ['a' => 1];".to_vec()));

    let settings = StoreSettings {
        cache_ttl_secs: 90,
        ..StoreSettings::default()
    };

    // Act
    let store = ConfigStore::new(settings, Some(Arc::new(cache)), Arc::new(files));

    // Assert
    assert_eq!(store.get("a"), Some(&ConfigValue::Int(1)));
}

#[test]
fn test_failed_permission_fix_still_attempts_write() {
    // Arrange
    let mut files = MockFiles::new();
    files.expect_exists().return_const(false);
    files.expect_is_writable().return_const(false);
    files
        .expect_set_writable()
        .times(1)
        .returning(|_| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));
    files
        .expect_write()
        .times(1)
        .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));

    let store = ConfigStore::new(StoreSettings::default(), None, Arc::new(files));

    // Act
    let result = store.save();

    // Assert
    assert!(matches!(result, Err(StoreError::FileWriteFailed { .. })));
}

#[test]
fn test_render_failure_writes_nothing() {
    // Arrange
    let mut files = MockFiles::new();
    files.expect_exists().return_const(false);
    files.expect_is_writable().return_const(true);
    files.expect_write().never();

    let mut store = ConfigStore::new(StoreSettings::default(), None, Arc::new(files));
    store.set("limits.ratio", f64::NAN);

    // Act
    let result = store.save();

    // Assert
    assert!(matches!(result, Err(StoreError::Format(_))));
}

// ── End to end on the real file system ────────────────────────────────────────

#[test]
fn test_db_settings_are_saved_with_comment_and_read_back() {
    // Arrange
    let dir = temp_config_dir();
    let mut store = ConfigStore::new(
        StoreSettings::for_dir(&dir),
        Some(Arc::new(MemoryCache::new())),
        Arc::new(FsBackend::new()),
    );
    store.set("db.host", "localhost");
    store.set("db.port", 5432);

    // Act
    store.save().expect("save must succeed");
    let text = std::fs::read_to_string(dir.join("config.php")).expect("file written");
    let reread = ConfigStore::read("config.php", &dir);

    // Assert
    assert!(text.starts_with("<?php \n/**\n* Arikaim\n"));
    assert!(text.contains("* @copyright   Copyright (c) 2017-"));
    assert!(text.ends_with(
        "*/\n\nreturn [\n\t// database settings\n\t'db' => [\n\t\t'host' => 'localhost',\n\t\t'port' => 5432\n\t]\n];\n"
    ));
    assert_eq!(reread.get("db.host"), Some(&ConfigValue::from("localhost")));
    assert_eq!(reread.get("db.port"), Some(&ConfigValue::Int(5432)));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_save_creates_missing_config_directory() {
    // Arrange
    let root = temp_config_dir();
    let dir = root.join("not").join("yet");
    let mut store = ConfigStore::read("app.php", &dir);
    store.set("settings.name", "demo");

    // Act
    store.save().expect("save must create the directory");

    // Assert
    assert!(store.has_file("app.php"));
    assert_eq!(store.config_file(), dir.join("app.php"));

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_reload_picks_up_external_edit() {
    // Arrange
    let dir = temp_config_dir();
    std::fs::write(dir.join("config.php"), "<?php return ['mode' => 'a'];").unwrap();
    let mut store = ConfigStore::new(
        StoreSettings::for_dir(&dir),
        Some(Arc::new(MemoryCache::new())),
        Arc::new(FsBackend::new()),
    );
    assert_eq!(store.get("mode"), Some(&ConfigValue::from("a")));

    // Act – a hand edit, then a reload through the cache
    std::fs::write(dir.join("config.php"), "<?php\nreturn array('mode' => \"b\");\n").unwrap();
    store.reload(true);

    // Assert
    assert_eq!(store.get("mode"), Some(&ConfigValue::from("b")));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_json_file_is_loaded_from_config_dir() {
    let dir = temp_config_dir();
    std::fs::write(dir.join("extension.json"), r#"{"name": "blog", "tags": ["a", "b"]}"#).unwrap();
    let store = ConfigStore::read("config.php", &dir);

    let doc = store.load_json_file("extension.json");

    assert_eq!(doc.get("name"), Some(&ConfigValue::from("blog")));
    assert_eq!(doc.get_path("tags.1"), Some(&ConfigValue::from("b")));

    std::fs::remove_dir_all(&dir).ok();
}
