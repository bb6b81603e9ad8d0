//! Shared fixtures: author on-disk stores for the diagnostic to inspect.

#![allow(dead_code)]

use statebisect::{SnapshotStore, StoreBuilder, StoreConfig, Version};
use std::path::{Path, PathBuf};

pub const NAMESPACES: &[&str] = &["acc", "stake", "slashing"];

/// Path of one version file inside a store, for tests that damage history.
pub fn version_file(root: &Path, version: u64) -> PathBuf {
    root.join("versions").join(format!("{:020}.ver", version))
}

/// Build a store with versions `0..=last` where `key` is present in
/// `namespace` from `appears_at` on (never, when `None`). Some unrelated
/// churn is committed alongside so every version differs.
pub fn build_presence_store(
    root: &Path,
    namespace: &str,
    key: &[u8],
    last: u64,
    appears_at: Option<u64>,
) {
    let mut builder = StoreBuilder::create(root, NAMESPACES).unwrap();
    for v in 0..=last {
        builder
            .set("acc", b"block-marker", v.to_string().as_bytes())
            .unwrap();
        if appears_at.is_some_and(|a| v == a) {
            builder.set(namespace, key, b"present").unwrap();
        }
        let commit = builder.commit().unwrap();
        assert_eq!(commit.version, Version(v));
    }
    // Builder drops here, releasing the store lock for the reader.
}

/// Build a store where `key` exists from version 0 and is deleted at
/// `vanishes_at`.
pub fn build_disappearance_store(
    root: &Path,
    namespace: &str,
    key: &[u8],
    last: u64,
    vanishes_at: u64,
) {
    let mut builder = StoreBuilder::create(root, NAMESPACES).unwrap();
    builder.set(namespace, key, b"present").unwrap();
    for v in 0..=last {
        builder
            .set("acc", b"block-marker", v.to_string().as_bytes())
            .unwrap();
        if v == vanishes_at {
            builder.delete(namespace, key).unwrap();
        }
        builder.commit().unwrap();
    }
}

pub fn open_store(root: &Path) -> SnapshotStore {
    SnapshotStore::open(StoreConfig::new(root)).unwrap()
}
