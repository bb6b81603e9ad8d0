//! On-disk layout of the versioned store.
//!
//! A store root holds a `MANIFEST` (namespace registry), a `LOCK` file, and
//! one file per committed version under `versions/`. Each version file
//! carries the complete materialized state of every registered namespace,
//! so loading a version never consults any other file.

use crate::error::{Result, StoreError};
use crate::types::{Hash, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes for the store manifest.
const MANIFEST_MAGIC: &[u8; 4] = b"SBS\0";

/// Magic bytes for version files.
const VERSION_MAGIC: &[u8; 4] = b"SBV\0";

/// Current store format version.
const FORMAT_VERSION: u8 = 1;

/// Subdirectory holding version files.
const VERSIONS_DIR: &str = "versions";

/// Filename extension for version files.
const VERSION_EXT: &str = "ver";

/// All keyed entries of one namespace, ordered lexicographically by key.
pub type NamespaceEntries = BTreeMap<Vec<u8>, Vec<u8>>;

/// Complete materialized state of the store at one version.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotData {
    /// The committed version this state belongs to.
    pub version: Version,

    /// Full contents of every registered namespace at this version.
    pub namespaces: BTreeMap<String, NamespaceEntries>,
}

/// Manifest body, encoded after the magic/format header.
#[derive(Debug, Serialize, Deserialize)]
struct ManifestBody {
    namespaces: Vec<String>,
}

/// Path of the versions directory under a store root.
pub fn versions_dir(root: &Path) -> PathBuf {
    root.join(VERSIONS_DIR)
}

/// Path of a single version file.
pub fn version_path(root: &Path, version: Version) -> PathBuf {
    versions_dir(root).join(format!("{:020}.{}", version.0, VERSION_EXT))
}

/// Parse a version number back out of a version filename.
pub fn parse_version_filename(name: &str) -> Option<Version> {
    let stem = name.strip_suffix(&format!(".{}", VERSION_EXT))?;
    stem.parse::<u64>().ok().map(Version)
}

/// Write the manifest: magic, format byte, MessagePack body.
pub fn write_manifest(root: &Path, namespaces: &[String]) -> Result<()> {
    let body = rmp_serde::to_vec(&ManifestBody {
        namespaces: namespaces.to_vec(),
    })?;

    let mut file = File::create(root.join("MANIFEST"))?;
    file.write_all(MANIFEST_MAGIC)?;
    file.write_all(&[FORMAT_VERSION])?;
    file.write_all(&body)?;
    file.sync_all()?;

    Ok(())
}

/// Read and verify the manifest; returns the registered namespaces.
pub fn read_manifest(root: &Path) -> Result<Vec<String>> {
    let mut file = File::open(root.join("MANIFEST"))
        .map_err(|e| StoreError::Unavailable(format!("cannot open MANIFEST: {}", e)))?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if &magic != MANIFEST_MAGIC {
        return Err(StoreError::InvalidFormat("invalid manifest magic".into()));
    }

    let mut version = [0u8; 1];
    file.read_exact(&mut version)?;
    if version[0] != FORMAT_VERSION {
        return Err(StoreError::InvalidFormat(format!(
            "unsupported store format version: {}",
            version[0]
        )));
    }

    let mut body = Vec::new();
    file.read_to_end(&mut body)?;
    let manifest: ManifestBody = rmp_serde::from_slice(&body)?;

    if manifest.namespaces.is_empty() {
        return Err(StoreError::InvalidFormat(
            "manifest registers no namespaces".into(),
        ));
    }

    Ok(manifest.namespaces)
}

/// Write one version file. Returns the content-derived root hash.
pub fn write_version_file(root: &Path, data: &SnapshotData) -> Result<Hash> {
    let payload = rmp_serde::to_vec(data)?;
    let checksum = crc32fast::hash(&payload);
    let root_hash = Hash::from_bytes(&payload);

    let path = version_path(root, data.version);
    let mut file = File::create(&path)?;
    file.write_all(VERSION_MAGIC)?;
    file.write_all(&[FORMAT_VERSION])?;
    file.write_all(&checksum.to_le_bytes())?;
    file.write_all(&payload)?;
    file.sync_all()?;

    Ok(root_hash)
}

/// Read and fully verify one version file.
///
/// The whole payload is read, checksum-verified, and decoded before
/// anything is returned, so a caller never observes partial state.
pub fn read_version_file(root: &Path, version: Version) -> Result<(SnapshotData, Hash)> {
    let bytes = fs::read(version_path(root, version))?;

    if bytes.len() < 9 {
        return Err(StoreError::InvalidFormat(format!(
            "version file {} truncated ({} bytes)",
            version,
            bytes.len()
        )));
    }
    if &bytes[0..4] != VERSION_MAGIC {
        return Err(StoreError::InvalidFormat(format!(
            "invalid version file magic for version {}",
            version
        )));
    }
    if bytes[4] != FORMAT_VERSION {
        return Err(StoreError::InvalidFormat(format!(
            "unsupported version file format: {}",
            bytes[4]
        )));
    }

    let stored_checksum = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
    let payload = &bytes[9..];
    let computed_checksum = crc32fast::hash(payload);
    if stored_checksum != computed_checksum {
        return Err(StoreError::ChecksumMismatch {
            expected: stored_checksum,
            got: computed_checksum,
        });
    }

    let data: SnapshotData = rmp_serde::from_slice(payload)?;
    if data.version != version {
        return Err(StoreError::Corruption(format!(
            "version file {} records version {}",
            version, data.version
        )));
    }

    Ok((data, Hash::from_bytes(payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_data(version: u64) -> SnapshotData {
        let mut entries = NamespaceEntries::new();
        entries.insert(b"key-a".to_vec(), b"value-a".to_vec());
        entries.insert(b"key-b".to_vec(), b"value-b".to_vec());

        let mut namespaces = BTreeMap::new();
        namespaces.insert("stake".to_string(), entries);
        namespaces.insert("slashing".to_string(), NamespaceEntries::new());

        SnapshotData {
            version: Version(version),
            namespaces,
        }
    }

    #[test]
    fn test_version_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(versions_dir(dir.path())).unwrap();

        let data = sample_data(7);
        let written_hash = write_version_file(dir.path(), &data).unwrap();
        let (read, read_hash) = read_version_file(dir.path(), Version(7)).unwrap();

        assert_eq!(read.version, Version(7));
        assert_eq!(read.namespaces["stake"][b"key-a".as_slice()], b"value-a");
        assert_eq!(written_hash, read_hash);
    }

    #[test]
    fn test_root_hash_is_deterministic() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(versions_dir(dir.path())).unwrap();

        let h1 = write_version_file(dir.path(), &sample_data(3)).unwrap();
        let h2 = write_version_file(dir.path(), &sample_data(3)).unwrap();
        assert_eq!(h1, h2);

        let h3 = write_version_file(dir.path(), &sample_data(4)).unwrap();
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_corrupt_payload_fails_checksum() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(versions_dir(dir.path())).unwrap();
        write_version_file(dir.path(), &sample_data(1)).unwrap();

        let path = version_path(dir.path(), Version(1));
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        let result = read_version_file(dir.path(), Version(1));
        assert!(matches!(result, Err(StoreError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(versions_dir(dir.path())).unwrap();
        write_version_file(dir.path(), &sample_data(1)).unwrap();

        let path = version_path(dir.path(), Version(1));
        let mut bytes = fs::read(&path).unwrap();
        bytes[0] = b'X';
        fs::write(&path, bytes).unwrap();

        let result = read_version_file(dir.path(), Version(1));
        assert!(matches!(result, Err(StoreError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_version_filename() {
        assert_eq!(
            parse_version_filename("00000000000000000042.ver"),
            Some(Version(42))
        );
        assert_eq!(parse_version_filename("junk.ver"), None);
        assert_eq!(parse_version_filename("00000000000000000042.tmp"), None);
    }

    #[test]
    fn test_manifest_roundtrip() {
        let dir = TempDir::new().unwrap();
        let namespaces = vec!["acc".to_string(), "stake".to_string()];
        write_manifest(dir.path(), &namespaces).unwrap();
        assert_eq!(read_manifest(dir.path()).unwrap(), namespaces);
    }
}
