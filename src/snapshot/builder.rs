//! Fixture writer for authoring stores in the on-disk format.
//!
//! The real write path belongs to the external runtime; `StoreBuilder`
//! exists so tests and operators can produce version histories to inspect.
//! Each commit materializes the full staged state as the next version file.

use crate::error::{Result, StoreError};
use crate::snapshot::format::{self, NamespaceEntries, SnapshotData};
use crate::types::{CommitId, Version};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Authors a versioned store on disk, one full snapshot per commit.
pub struct StoreBuilder {
    root: PathBuf,

    _lock_file: File,

    /// Current (uncommitted) state of every namespace.
    staged: BTreeMap<String, NamespaceEntries>,

    /// Version the next commit will be assigned.
    next_version: Version,
}

impl StoreBuilder {
    /// Create a fresh store rooted at `path` with the given namespaces.
    pub fn create(path: impl Into<PathBuf>, namespaces: &[&str]) -> Result<Self> {
        if namespaces.is_empty() {
            return Err(StoreError::InvalidFormat(
                "a store needs at least one namespace".into(),
            ));
        }

        let root = path.into();
        fs::create_dir_all(&root)?;
        fs::create_dir_all(format::versions_dir(&root))?;

        let names: Vec<String> = namespaces.iter().map(|s| s.to_string()).collect();
        format::write_manifest(&root, &names)?;

        let lock_file = File::create(root.join("LOCK"))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| StoreError::Locked)?;

        let staged = names
            .iter()
            .map(|n| (n.clone(), NamespaceEntries::new()))
            .collect();

        Ok(Self {
            root,
            _lock_file: lock_file,
            staged,
            next_version: Version(0),
        })
    }

    /// Root directory of the store being built.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stage a key-value pair in a namespace.
    pub fn set(&mut self, namespace: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.namespace_mut(namespace)?
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    /// Stage a key deletion.
    pub fn delete(&mut self, namespace: &str, key: &[u8]) -> Result<()> {
        self.namespace_mut(namespace)?.remove(key);
        Ok(())
    }

    /// Commit the staged state as the next version.
    pub fn commit(&mut self) -> Result<CommitId> {
        let version = self.next_version;
        let data = SnapshotData {
            version,
            namespaces: self.staged.clone(),
        };

        let root_hash = format::write_version_file(&self.root, &data)?;
        self.next_version = Version(version.0 + 1);

        Ok(CommitId { version, root_hash })
    }

    /// Drop all version files below `floor`, raising the retained floor.
    pub fn prune_below(&mut self, floor: Version) -> Result<()> {
        for v in 0..floor.0 {
            let path = format::version_path(&self.root, Version(v));
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn namespace_mut(&mut self, name: &str) -> Result<&mut NamespaceEntries> {
        self.staged
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownNamespace(name.to_string()))
    }
}
