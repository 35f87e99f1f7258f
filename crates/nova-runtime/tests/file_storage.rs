#![forbid(unsafe_code)]

//! JSON file storage on a real filesystem.
//!
//! Run:
//!   cargo test -p nova-runtime --features state-persistence --test file_storage

use nova_runtime::{
    DEFAULT_STORAGE_KEY, FileStorage, NoPreference, PreferenceStore, ResolutionSource,
    StorageError, ThemeConfig, ThemeController,
};
use nova_style::AppearanceMode;
use tempfile::TempDir;

fn storage_in(dir: &TempDir) -> FileStorage {
    FileStorage::new(dir.path().join("prefs").join("appearance.json"))
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let storage = storage_in(&dir);
    assert!(!storage.path().exists());
    assert_eq!(storage.load(DEFAULT_STORAGE_KEY).unwrap(), None);
}

#[test]
fn store_creates_parent_dirs_and_round_trips() {
    let dir = TempDir::new().unwrap();
    let mut storage = storage_in(&dir);
    storage.store(DEFAULT_STORAGE_KEY, "light").unwrap();
    assert!(storage.path().exists());

    let reopened = FileStorage::new(storage.path());
    assert_eq!(
        reopened.load(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
        Some("light")
    );
}

#[test]
fn unrelated_entries_survive_writes() {
    let dir = TempDir::new().unwrap();
    let mut storage = storage_in(&dir);
    storage.store("editor.font", "mono").unwrap();
    storage.store(DEFAULT_STORAGE_KEY, "dark").unwrap();
    storage.remove(DEFAULT_STORAGE_KEY).unwrap();

    assert_eq!(storage.load("editor.font").unwrap().as_deref(), Some("mono"));
    assert_eq!(storage.load(DEFAULT_STORAGE_KEY).unwrap(), None);
    assert!(!storage.path().with_extension("tmp").exists());
}

#[test]
fn empty_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appearance.json");
    std::fs::write(&path, "  \n").unwrap();
    let storage = FileStorage::new(&path);
    assert_eq!(storage.load(DEFAULT_STORAGE_KEY).unwrap(), None);
}

#[test]
fn corrupt_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appearance.json");
    std::fs::write(&path, "{ not json").unwrap();
    let storage = FileStorage::new(&path);
    assert!(matches!(
        storage.load(DEFAULT_STORAGE_KEY),
        Err(StorageError::Serialization(_))
    ));
}

#[test]
fn controller_choice_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appearance.json");

    let first = ThemeController::builder()
        .storage(FileStorage::new(&path))
        .preference(NoPreference)
        .build();
    first.initialize();
    first.set_mode(AppearanceMode::Light);
    drop(first);

    let second = ThemeController::builder()
        .config(ThemeConfig::default())
        .storage(FileStorage::new(&path))
        .preference(NoPreference)
        .build();
    assert_eq!(second.initialize(), AppearanceMode::Light);
}

#[test]
fn corrupt_file_falls_back_without_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appearance.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let theme = ThemeController::builder()
        .config(ThemeConfig::default().with_default_mode(AppearanceMode::Light))
        .storage(FileStorage::new(&path))
        .build();
    assert_eq!(theme.initialize(), AppearanceMode::Light);
    theme.toggle();
    assert_eq!(theme.mode(), AppearanceMode::Dark);
}

#[test]
fn store_replaces_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appearance.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut storage = FileStorage::new(&path);
    storage.store(DEFAULT_STORAGE_KEY, "dark").unwrap();
    assert_eq!(storage.load(DEFAULT_STORAGE_KEY).unwrap().as_deref(), Some("dark"));
}

#[test]
fn remove_replaces_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appearance.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut storage = FileStorage::new(&path);
    storage.remove(DEFAULT_STORAGE_KEY).unwrap();
    assert_eq!(storage.load(DEFAULT_STORAGE_KEY).unwrap(), None);
}

#[test]
fn choice_over_corrupt_file_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appearance.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let first = ThemeController::builder()
        .storage(FileStorage::new(&path))
        .preference(NoPreference)
        .build();
    assert_eq!(first.initialize(), AppearanceMode::Dark);
    first.set_mode(AppearanceMode::Light);
    drop(first);

    let second = ThemeController::builder()
        .storage(FileStorage::new(&path))
        .preference(NoPreference)
        .build();
    assert_eq!(second.initialize(), AppearanceMode::Light);
    assert_eq!(second.resolution_source(), Some(ResolutionSource::Persisted));
}

#[test]
fn resolved_mode_replaces_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appearance.json");
    std::fs::write(&path, "{ not json").unwrap();

    let theme = ThemeController::builder()
        .storage(FileStorage::new(&path))
        .preference(NoPreference)
        .build();
    assert_eq!(theme.initialize(), AppearanceMode::Dark);
    assert_eq!(
        FileStorage::new(&path).load(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
        Some("dark")
    );
}
