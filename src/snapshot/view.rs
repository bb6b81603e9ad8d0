//! Read-only namespace views over the active snapshot.

use crate::snapshot::format::NamespaceEntries;
use crate::types::Version;
use std::ops::Bound;

/// A read-only accessor scoped to one namespace at one loaded version.
///
/// The view borrows the store's active snapshot, so it cannot outlive the
/// next `load` call. Lookups are pure reads; a missing key is an expected
/// outcome, never an error.
pub struct NamespaceView<'a> {
    name: &'a str,
    version: Version,
    entries: &'a NamespaceEntries,
}

impl<'a> NamespaceView<'a> {
    pub(crate) fn new(name: &'a str, version: Version, entries: &'a NamespaceEntries) -> Self {
        Self {
            name,
            version,
            entries,
        }
    }

    /// Namespace this view is bound to.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Version this view is bound to.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Look up a key. `None` means the key is absent at this version.
    pub fn get(&self, key: &[u8]) -> Option<&'a [u8]> {
        self.entries.get(key).map(|v| v.as_slice())
    }

    /// Whether the key is present at this version.
    pub fn has(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys in the namespace at this version.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in `[from, to)` in lexicographic key order.
    ///
    /// `None` bounds are open ends. The iterator is finite and restartable;
    /// calling `scan` again yields the same sequence.
    pub fn scan(
        &self,
        from: Option<&[u8]>,
        to: Option<&[u8]>,
    ) -> impl Iterator<Item = (&'a [u8], &'a [u8])> + 'a {
        // An inverted range is an empty scan, never a panic: BTreeMap::range
        // rejects start > end, so collapse it to an empty bound pair.
        let (lower, upper) = match (from, to) {
            (Some(f), Some(t)) if f > t => {
                (Bound::Included(t.to_vec()), Bound::Excluded(t.to_vec()))
            }
            _ => (
                from.map_or(Bound::Unbounded, |k| Bound::Included(k.to_vec())),
                to.map_or(Bound::Unbounded, |k| Bound::Excluded(k.to_vec())),
            ),
        };
        let entries = self.entries;
        entries
            .range((lower, upper))
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
