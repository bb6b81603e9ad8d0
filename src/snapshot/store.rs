//! Snapshot store: owns the on-disk version history and the single
//! active-snapshot slot.

use crate::error::{Result, StoreError};
use crate::snapshot::format::{self, SnapshotData};
use crate::snapshot::view::NamespaceView;
use crate::types::{CommitId, Hash, Version};
use fs2::FileExt;
use lru::LruCache;
use std::fs::{self, File};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Root directory of the persisted version history.
    pub path: PathBuf,

    /// Number of decoded version snapshots kept in memory.
    pub cache_size: usize,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache_size: 16,
        }
    }
}

/// The one snapshot currently loaded for inspection.
struct ActiveSnapshot {
    commit: CommitId,
    data: Arc<SnapshotData>,
}

/// Cache entry: decoded state plus its content hash, so a cache hit yields
/// the same `CommitId` as a cold load.
struct CachedSnapshot {
    data: Arc<SnapshotData>,
    root_hash: Hash,
}

/// Read-only handle on a versioned, multi-namespace store.
///
/// At most one version is active at a time. `load` takes `&mut self` while
/// every [`NamespaceView`] borrows `&self`, so the borrow checker rejects
/// any use of a view obtained before the most recent load; a stale view
/// can never silently read the wrong version.
pub struct SnapshotStore {
    root: PathBuf,

    /// Exclusive advisory lock held for the lifetime of the store.
    _lock_file: File,

    /// Namespaces registered in the manifest, in manifest order.
    namespaces: Vec<String>,

    /// Lowest retained version (pruning removes from the bottom).
    floor: Version,

    /// Highest committed version known at open time.
    latest: Version,

    /// Decoded version files, so reloading a recent version skips disk.
    cache: LruCache<Version, CachedSnapshot>,

    active: Option<ActiveSnapshot>,
}

impl SnapshotStore {
    /// Open an existing store for read-only inspection.
    pub fn open(config: StoreConfig) -> Result<Self> {
        if !config.path.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "no store at {}",
                config.path.display()
            )));
        }

        let namespaces = format::read_manifest(&config.path)?;
        let lock_file = Self::acquire_lock(&config.path)?;
        let (floor, latest) = Self::scan_versions(&config.path)?;

        debug!(
            root = %config.path.display(),
            floor = floor.0,
            latest = latest.0,
            namespaces = namespaces.len(),
            "opened snapshot store"
        );

        let cache_size = NonZeroUsize::new(config.cache_size).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            root: config.path,
            _lock_file: lock_file,
            namespaces,
            floor,
            latest,
            cache: LruCache::new(cache_size),
            active: None,
        })
    }

    /// Highest committed version known at open time.
    pub fn latest_version(&self) -> Version {
        self.latest
    }

    /// Lowest version still retained (history below this has been pruned).
    pub fn retained_floor(&self) -> Version {
        self.floor
    }

    /// Namespaces registered at store construction.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Identity of the currently active snapshot, if any.
    pub fn active_commit(&self) -> Option<CommitId> {
        self.active.as_ref().map(|a| a.commit)
    }

    /// Make `version` the active snapshot.
    ///
    /// The version file is read, checksum-verified, and decoded in full
    /// before the active slot is replaced; on any failure the previously
    /// loaded version (if any) stays active.
    pub fn load(&mut self, version: Version) -> Result<CommitId> {
        if version < self.floor || version > self.latest {
            return Err(self.version_not_found(version));
        }

        let cached = self
            .cache
            .get(&version)
            .map(|c| (Arc::clone(&c.data), c.root_hash));

        let (data, root_hash) = match cached {
            Some(pair) => pair,
            None => {
                let (data, hash) = self.read_version(version)?;
                let data = Arc::new(data);
                self.cache.put(
                    version,
                    CachedSnapshot {
                        data: Arc::clone(&data),
                        root_hash: hash,
                    },
                );
                (data, hash)
            }
        };

        for name in &self.namespaces {
            if !data.namespaces.contains_key(name) {
                return Err(StoreError::Corruption(format!(
                    "version {} is missing namespace {:?}",
                    version, name
                )));
            }
        }

        let commit = CommitId { version, root_hash };
        self.active = Some(ActiveSnapshot { commit, data });

        debug!(version = version.0, root_hash = %commit.root_hash, "loaded snapshot");
        Ok(commit)
    }

    /// A view of one namespace at the currently active version.
    pub fn namespace(&self, name: &str) -> Result<NamespaceView<'_>> {
        // The view borrows the registered name, not the caller's argument,
        // so it lives as long as the store borrow.
        let Some(name) = self.namespaces.iter().find(|n| n.as_str() == name) else {
            return Err(StoreError::UnknownNamespace(name.to_string()));
        };
        let active = self.active.as_ref().ok_or(StoreError::NoActiveSnapshot)?;
        let entries = active
            .data
            .namespaces
            .get(name)
            .ok_or_else(|| StoreError::Corruption(format!("namespace {:?} vanished", name)))?;

        Ok(NamespaceView::new(name.as_str(), active.commit.version, entries))
    }

    // --- Private Helpers ---

    fn read_version(&self, version: Version) -> Result<(SnapshotData, Hash)> {
        match format::read_version_file(&self.root, version) {
            Ok(pair) => Ok(pair),
            // A hole inside the retained range means this version was
            // pruned out from under us, not that the store is corrupt.
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(self.version_not_found(version))
            }
            Err(e) => Err(e),
        }
    }

    fn version_not_found(&self, requested: Version) -> StoreError {
        StoreError::VersionNotFound {
            requested,
            floor: self.floor,
            latest: self.latest,
        }
    }

    fn acquire_lock(root: &Path) -> Result<File> {
        let lock_file = File::create(root.join("LOCK"))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| StoreError::Locked)?;
        Ok(lock_file)
    }

    /// Scan the versions directory for the retained range.
    fn scan_versions(root: &Path) -> Result<(Version, Version)> {
        let dir = format::versions_dir(root);
        if !dir.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "no versions directory at {}",
                dir.display()
            )));
        }

        let mut floor: Option<Version> = None;
        let mut latest: Option<Version> = None;

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(v) = name.to_str().and_then(format::parse_version_filename) else {
                continue;
            };
            floor = Some(floor.map_or(v, |f| f.min(v)));
            latest = Some(latest.map_or(v, |l| l.max(v)));
        }

        match (floor, latest) {
            (Some(f), Some(l)) => Ok((f, l)),
            _ => Err(StoreError::Unavailable(
                "store contains no committed versions".into(),
            )),
        }
    }
}
