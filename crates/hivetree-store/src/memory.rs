//! In-memory key store for tests and embedding.
//!
//! [`InMemoryKeyStore`] keeps one key tree per hive in a `HashMap` behind a
//! `RwLock`, plus a handle table. It implements the full [`KeyStore`] trait
//! with the native store's name semantics: lookups are case-insensitive,
//! stored names keep the case they were first written with, and enumeration
//! is ordered by the case-folded name. Data is lost when the store drops.
//!
//! Handles carry the path they were opened on, not a pointer into the tree:
//! every operation re-resolves the path, so a handle to a key removed
//! behind it reports [`StoreError::KeyNotFound`] instead of stale data.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use hivetree_types::Hive;

use crate::error::{StoreError, StoreResult};
use crate::handle::KeyHandle;
use crate::traits::{Access, KeyStore, RawValue};

/// One key: subkeys and values, both keyed by case-folded name and storing
/// the case-preserved original alongside.
#[derive(Debug, Default)]
struct KeyNode {
    subkeys: BTreeMap<String, (String, KeyNode)>,
    values: BTreeMap<String, (String, RawValue)>,
}

#[derive(Debug)]
struct OpenKey {
    hive: Hive,
    segments: Vec<String>,
    access: Access,
    display: String,
}

/// An in-memory implementation of [`KeyStore`].
#[derive(Debug)]
pub struct InMemoryKeyStore {
    hives: RwLock<HashMap<Hive, KeyNode>>,
    handles: RwLock<HashMap<u64, OpenKey>>,
    next_handle: AtomicU64,
}

impl InMemoryKeyStore {
    /// Create a store with every hive root present and empty.
    pub fn new() -> Self {
        let mut hives = HashMap::new();
        for hive in Hive::ALL {
            hives.insert(hive, KeyNode::default());
        }
        InMemoryKeyStore {
            hives: RwLock::new(hives),
            handles: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Number of handles issued and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.handles.read().map(|h| h.len()).unwrap_or(0)
    }

    fn issue(&self, hive: Hive, path: &str, access: Access) -> StoreResult<KeyHandle> {
        let raw = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let open = OpenKey {
            hive,
            segments: fold_segments(path),
            access,
            display: display_path(hive, path),
        };
        self.handles
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(raw, open);
        Ok(KeyHandle::new(raw))
    }

    /// Snapshot a handle's address; `InvalidHandle` if never issued or
    /// already closed.
    fn address(&self, handle: KeyHandle) -> StoreResult<(Hive, Vec<String>, Access, String)> {
        let handles = self.handles.read().map_err(|_| StoreError::Poisoned)?;
        let open = handles
            .get(&handle.raw())
            .ok_or(StoreError::InvalidHandle)?;
        Ok((
            open.hive,
            open.segments.clone(),
            open.access,
            open.display.clone(),
        ))
    }

    /// Run `f` on the node a handle addresses, resolved freshly.
    fn with_node<T>(
        &self,
        handle: KeyHandle,
        f: impl FnOnce(&KeyNode) -> T,
    ) -> StoreResult<T> {
        let (hive, segments, _, display) = self.address(handle)?;
        let hives = self.hives.read().map_err(|_| StoreError::Poisoned)?;
        let node = resolve(&hives, hive, &segments)
            .ok_or(StoreError::KeyNotFound { path: display })?;
        Ok(f(node))
    }

    /// Like [`with_node`], but mutable and requiring a write-mode handle.
    fn with_node_mut<T>(
        &self,
        handle: KeyHandle,
        f: impl FnOnce(&mut KeyNode) -> T,
    ) -> StoreResult<T> {
        let (hive, segments, access, display) = self.address(handle)?;
        if access != Access::Write {
            return Err(StoreError::ReadOnlyHandle);
        }
        let mut hives = self.hives.write().map_err(|_| StoreError::Poisoned)?;
        let node = resolve_mut(&mut hives, hive, &segments)
            .ok_or(StoreError::KeyNotFound { path: display })?;
        Ok(f(node))
    }
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStore for InMemoryKeyStore {
    fn open(&self, hive: Hive, path: &str, access: Access) -> StoreResult<KeyHandle> {
        let hives = self.hives.read().map_err(|_| StoreError::Poisoned)?;
        if resolve(&hives, hive, &fold_segments(path)).is_none() {
            return Err(StoreError::KeyNotFound {
                path: display_path(hive, path),
            });
        }
        drop(hives);
        self.issue(hive, path, access)
    }

    fn create(&self, hive: Hive, path: &str) -> StoreResult<KeyHandle> {
        let mut hives = self.hives.write().map_err(|_| StoreError::Poisoned)?;
        let mut node = hives.entry(hive).or_default();
        for segment in split_segments(path) {
            node = &mut node
                .subkeys
                .entry(segment.to_lowercase())
                .or_insert_with(|| (segment.to_string(), KeyNode::default()))
                .1;
        }
        drop(hives);
        self.issue(hive, path, Access::Write)
    }

    fn close(&self, handle: KeyHandle) -> StoreResult<()> {
        self.handles
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .remove(&handle.raw())
            .map(|_| ())
            .ok_or(StoreError::InvalidHandle)
    }

    fn subkey_name(&self, handle: KeyHandle, index: usize) -> StoreResult<Option<String>> {
        self.with_node(handle, |node| {
            node.subkeys.values().nth(index).map(|(name, _)| name.clone())
        })
    }

    fn value_entry(
        &self,
        handle: KeyHandle,
        index: usize,
    ) -> StoreResult<Option<(String, RawValue)>> {
        self.with_node(handle, |node| {
            node.values
                .values()
                .nth(index)
                .map(|(name, value)| (name.clone(), value.clone()))
        })
    }

    fn read_value(&self, handle: KeyHandle, name: &str) -> StoreResult<Option<RawValue>> {
        self.with_node(handle, |node| {
            node.values
                .get(&name.to_lowercase())
                .map(|(_, value)| value.clone())
        })
    }

    fn write_value(&self, handle: KeyHandle, name: &str, value: &RawValue) -> StoreResult<()> {
        self.with_node_mut(handle, |node| {
            // A rewrite keeps the name's first-written case.
            node.values
                .entry(name.to_lowercase())
                .and_modify(|(_, existing)| *existing = value.clone())
                .or_insert_with(|| (name.to_string(), value.clone()));
        })
    }

    fn remove_value(&self, handle: KeyHandle, name: &str) -> StoreResult<bool> {
        self.with_node_mut(handle, |node| {
            node.values.remove(&name.to_lowercase()).is_some()
        })
    }

    fn remove_key(&self, hive: Hive, path: &str) -> StoreResult<bool> {
        let segments = fold_segments(path);
        let Some((leaf, parents)) = segments.split_last() else {
            // Hive roots are permanent.
            return Ok(false);
        };
        let mut hives = self.hives.write().map_err(|_| StoreError::Poisoned)?;
        let Some(parent) = resolve_mut(&mut hives, hive, parents) else {
            return Ok(false);
        };
        let has_subkeys = match parent.subkeys.get(leaf) {
            None => return Ok(false),
            Some((_, node)) => !node.subkeys.is_empty(),
        };
        if has_subkeys {
            return Err(StoreError::NotEmpty {
                path: display_path(hive, path),
            });
        }
        parent.subkeys.remove(leaf);
        Ok(true)
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('\\').filter(|segment| !segment.is_empty())
}

fn fold_segments(path: &str) -> Vec<String> {
    split_segments(path).map(str::to_lowercase).collect()
}

fn display_path(hive: Hive, path: &str) -> String {
    if path.is_empty() {
        hive.to_string()
    } else {
        format!("{hive}\\{path}")
    }
}

fn resolve<'t>(
    hives: &'t HashMap<Hive, KeyNode>,
    hive: Hive,
    segments: &[String],
) -> Option<&'t KeyNode> {
    let mut node = hives.get(&hive)?;
    for segment in segments {
        node = &node.subkeys.get(segment)?.1;
    }
    Some(node)
}

fn resolve_mut<'t>(
    hives: &'t mut HashMap<Hive, KeyNode>,
    hive: Hive,
    segments: &[String],
) -> Option<&'t mut KeyNode> {
    let mut node = hives.get_mut(&hive)?;
    for segment in segments {
        node = &mut node.subkeys.get_mut(segment)?.1;
    }
    Some(node)
}
