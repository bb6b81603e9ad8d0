//! Error handling and edge case tests.

mod common;

use common::{build_presence_store, version_file};
use statebisect::{SnapshotStore, StoreBuilder, StoreConfig, StoreError, Version};
use tempfile::TempDir;

#[test]
fn test_open_missing_root() {
    let dir = TempDir::new().unwrap();
    let result = SnapshotStore::open(StoreConfig::new(dir.path().join("nonexistent")));
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

#[test]
fn test_open_directory_without_manifest() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");
    std::fs::create_dir_all(&root).unwrap();

    let result = SnapshotStore::open(StoreConfig::new(&root));
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

#[test]
fn test_open_store_with_no_committed_versions() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");
    {
        let _builder = StoreBuilder::create(&root, &["acc"]).unwrap();
        // No commit.
    }

    let result = SnapshotStore::open(StoreConfig::new(&root));
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

#[test]
fn test_open_corrupt_manifest() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");
    build_presence_store(&root, "stake", b"k", 3, None);

    let manifest = root.join("MANIFEST");
    let mut bytes = std::fs::read(&manifest).unwrap();
    bytes[0] = b'X';
    std::fs::write(&manifest, bytes).unwrap();

    let result = SnapshotStore::open(StoreConfig::new(&root));
    assert!(matches!(result, Err(StoreError::InvalidFormat(_))));
}

#[test]
fn test_concurrent_store_access() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");

    // The builder still holds the exclusive lock.
    let mut builder = StoreBuilder::create(&root, &["acc"]).unwrap();
    builder.commit().unwrap();

    let result = SnapshotStore::open(StoreConfig::new(&root));
    assert!(matches!(result, Err(StoreError::Locked)));

    drop(builder);
    SnapshotStore::open(StoreConfig::new(&root)).unwrap();
}

#[test]
fn test_load_corrupt_version_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");
    build_presence_store(&root, "stake", b"k", 5, Some(2));

    let path = version_file(&root, 3);
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[12] ^= 0xFF;
    std::fs::write(&path, bytes).unwrap();

    let mut store = SnapshotStore::open(StoreConfig::new(&root)).unwrap();
    let result = store.load(Version(3));
    assert!(matches!(result, Err(StoreError::ChecksumMismatch { .. })));
}

#[test]
fn test_load_truncated_version_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");
    build_presence_store(&root, "stake", b"k", 5, Some(2));

    std::fs::write(version_file(&root, 4), b"SBV").unwrap();

    let mut store = SnapshotStore::open(StoreConfig::new(&root)).unwrap();
    let result = store.load(Version(4));
    assert!(matches!(result, Err(StoreError::InvalidFormat(_))));
}

#[test]
fn test_version_not_found_carries_context() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");
    build_presence_store(&root, "stake", b"k", 10, None);

    let mut store = SnapshotStore::open(StoreConfig::new(&root)).unwrap();
    match store.load(Version(999)) {
        Err(StoreError::VersionNotFound {
            requested,
            floor,
            latest,
        }) => {
            assert_eq!(requested, Version(999));
            assert_eq!(floor, Version(0));
            assert_eq!(latest, Version(10));
        }
        other => panic!("expected VersionNotFound, got {:?}", other),
    }
}

#[test]
fn test_error_messages_are_operator_readable() {
    let err = StoreError::VersionNotFound {
        requested: Version(101),
        floor: Version(0),
        latest: Version(100),
    };
    assert_eq!(
        err.to_string(),
        "Version 101 not found (retained range is 0..=100)"
    );

    let err = StoreError::UnknownNamespace("gov".into());
    assert_eq!(err.to_string(), "Unknown namespace: gov");
}
