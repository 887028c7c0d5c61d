//! Path-addressable tree nodes.
//!
//! A [`Container`] is a value object: `(hive, path)` plus a borrow of the
//! backing store. Constructing or navigating one performs no I/O and
//! implies nothing about existence — [`Container::exists`] asks the store
//! freshly every time. Composite operations (recursive delete, rename) are
//! assembled from store primitives and are not atomic; their
//! partial-failure windows are documented on each method.

use std::fmt;

use tracing::debug;

use hivetree_store::{Access, KeyStore, ScopedKey, StoreError};
use hivetree_types::{Hive, Value, ValueTag};

use crate::error::{key_error, KeyError, KeyResult};
use crate::field::Field;
use crate::snapshot::{export_tree_typed, import_tree_typed};

/// The path separator between container segments.
pub const SEPARATOR: char = '\\';

/// A key node in the tree: `(hive, path)` over a backing store.
///
/// The empty path denotes the hive root. Equality is structural on
/// `(hive, path)`; two containers over different stores but the same
/// address compare equal, because the address is the identity.
#[derive(Clone)]
pub struct Container<'s> {
    store: &'s dyn KeyStore,
    hive: Hive,
    path: String,
}

impl<'s> Container<'s> {
    /// Address a container. Pure: no I/O, no existence check.
    ///
    /// Separators at the ends of `path` are trimmed; interior separators
    /// delimit segments and stay untouched.
    pub fn new(store: &'s dyn KeyStore, hive: Hive, path: &str) -> Self {
        Container {
            store,
            hive,
            path: path.trim_matches(SEPARATOR).to_string(),
        }
    }

    /// The hive this container lives under.
    pub fn hive(&self) -> Hive {
        self.hive
    }

    /// The path under the hive; empty for the hive root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment; empty for the hive root.
    pub fn name(&self) -> &str {
        self.path.rsplit(SEPARATOR).next().unwrap_or("")
    }

    /// Whether this container addresses the hive root.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The containing container, or `None` for the hive root.
    pub fn parent(&self) -> Option<Container<'s>> {
        if self.is_root() {
            return None;
        }
        let parent_path = match self.path.rsplit_once(SEPARATOR) {
            Some((prefix, _)) => prefix,
            None => "",
        };
        Some(Container::new(self.store, self.hive, parent_path))
    }

    /// Compose a child address. Pure path arithmetic, no I/O.
    ///
    /// `segment` may itself be a `\`-separated sub-path; only the composed
    /// path's ends are re-normalized.
    pub fn navigate(&self, segment: &str) -> Container<'s> {
        Container::new(
            self.store,
            self.hive,
            &format!("{}{}{}", self.path, SEPARATOR, segment),
        )
    }

    /// Whether the container is materialized in the store, queried freshly.
    ///
    /// Only "not found" maps to `false`; any other store failure
    /// propagates.
    pub fn exists(&self) -> KeyResult<bool> {
        match ScopedKey::open(self.store, self.hive, &self.path, Access::Read) {
            Ok(_key) => Ok(true),
            Err(StoreError::KeyNotFound { .. }) => Ok(false),
            Err(other) => Err(other.into()),
        }
    }

    /// Materialize this container and every missing ancestor. Idempotent;
    /// a no-op for the hive root (roots always exist).
    pub fn create(&self) -> KeyResult<()> {
        if self.is_root() {
            return Ok(());
        }
        let _key = ScopedKey::create(self.store, self.hive, &self.path)?;
        Ok(())
    }

    /// Delete this container. A no-op for the hive root.
    ///
    /// When `recursive` is false the contents are checked first: a
    /// container still holding subcontainers or fields fails with
    /// [`KeyError::NotEmpty`] and nothing is mutated.
    ///
    /// When `recursive` is true, child containers go depth-first (sibling
    /// order unspecified), then this container's fields, then the node
    /// itself. The store offers no multi-step transaction: a failure
    /// partway leaves whatever the completed steps produced, and the error
    /// names the first failing step.
    pub fn delete(&self, recursive: bool) -> KeyResult<()> {
        if self.is_root() {
            return Ok(());
        }
        let children: Vec<String> = self.containers()?.collect::<KeyResult<_>>()?;
        if recursive {
            debug!(container = %self, children = children.len(), "deleting subtree");
            for child in &children {
                self.navigate(child).delete(true)?;
            }
        }
        let fields: Vec<String> = self.fields()?.collect::<KeyResult<_>>()?;
        if !recursive && (!children.is_empty() || !fields.is_empty()) {
            return Err(KeyError::NotEmpty {
                path: self.to_string(),
                subkeys: children.len(),
                fields: fields.len(),
            });
        }
        if !fields.is_empty() {
            let key = ScopedKey::open(self.store, self.hive, &self.path, Access::Write)
                .map_err(key_error)?;
            for name in fields {
                self.store.remove_value(key.handle(), &name)?;
            }
        }
        // Ok(false) here means the key vanished between the enumeration
        // and this call; surface it like any other mid-sequence not-found.
        if !self.store.remove_key(self.hive, &self.path)? {
            return Err(KeyError::NotFound {
                path: self.to_string(),
            });
        }
        Ok(())
    }

    /// Move this subtree under a sibling name.
    ///
    /// The store has no rename primitive; this is export (typed), create
    /// the sibling, import, then delete the old subtree recursively, and
    /// finally repoint `self` at the new path. The old subtree goes only
    /// after the new one fully exists, so a late failure leaves both
    /// subtrees rather than neither.
    ///
    /// A `new_name` that equals the current name under the store's
    /// case-insensitive comparison is a successful no-op — the "new"
    /// subtree would be the old one, and the final delete would destroy
    /// it.
    pub fn rename(&mut self, new_name: &str) -> KeyResult<()> {
        let parent = self.parent().ok_or(KeyError::RootUnsupported { op: "rename" })?;
        if new_name.trim_matches(SEPARATOR).eq_ignore_ascii_case(self.name()) {
            return Ok(());
        }
        let snapshot = export_tree_typed(self)?;
        let target = parent.navigate(new_name);
        debug!(from = %self, to = %target, "renaming container");
        target.create()?;
        import_tree_typed(&target, &snapshot)?;
        self.delete(true)?;
        self.path = target.path;
        Ok(())
    }

    /// Enumerate immediate child container names, lazily.
    ///
    /// The iterator queries the store index by index and holds one scoped
    /// handle for the pass; call again to restart. A concurrent mutation
    /// has undefined effect on the remaining results.
    pub fn containers(&self) -> KeyResult<NameIter<'s>> {
        NameIter::open(self.store, self.hive, &self.path, NameKind::Subkeys)
    }

    /// Enumerate field names, lazily. Same contract as
    /// [`Container::containers`].
    pub fn fields(&self) -> KeyResult<NameIter<'s>> {
        NameIter::open(self.store, self.hive, &self.path, NameKind::Fields)
    }

    /// Address a field under this container. Pure, like [`navigate`].
    ///
    /// [`navigate`]: Container::navigate
    pub fn field<'c>(&'c self, name: &str) -> Field<'c, 's> {
        Field::new(self, name)
    }

    /// Shortcut for [`Field::get`].
    pub fn get(&self, name: &str) -> KeyResult<Option<Value>> {
        self.field(name).get()
    }

    /// Shortcut for [`Field::set`].
    pub fn set(&self, name: &str, value: impl Into<Value>) -> KeyResult<()> {
        self.field(name).set(value)
    }

    /// Shortcut for [`Field::set_with_tag`].
    pub fn set_with_tag(
        &self,
        name: &str,
        value: impl Into<Value>,
        tag: ValueTag,
    ) -> KeyResult<()> {
        self.field(name).set_with_tag(value, tag)
    }

    /// Shortcut for [`Field::delete`].
    pub fn remove(&self, name: &str) -> KeyResult<()> {
        self.field(name).delete()
    }

    pub(crate) fn store(&self) -> &'s dyn KeyStore {
        self.store
    }
}

impl PartialEq for Container<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.hive == other.hive && self.path == other.path
    }
}

impl Eq for Container<'_> {}

impl fmt::Display for Container<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{}", self.hive)
        } else {
            write!(f, "{}{}{}", self.hive, SEPARATOR, self.path)
        }
    }
}

impl fmt::Debug for Container<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Container({self})")
    }
}

enum NameKind {
    Subkeys,
    Fields,
}

/// Lazy, index-driven name enumeration over one scoped handle.
///
/// Yields `Ok(name)` per entry and stops at the store's out-of-range
/// signal; a store failure yields one `Err` and then stops. The handle is
/// released when the iterator drops.
pub struct NameIter<'s> {
    store: &'s dyn KeyStore,
    key: ScopedKey<'s>,
    kind: NameKind,
    index: usize,
    done: bool,
}

impl<'s> NameIter<'s> {
    fn open(store: &'s dyn KeyStore, hive: Hive, path: &str, kind: NameKind) -> KeyResult<Self> {
        let key = ScopedKey::open(store, hive, path, Access::Read).map_err(key_error)?;
        Ok(NameIter {
            store,
            key,
            kind,
            index: 0,
            done: false,
        })
    }
}

impl Iterator for NameIter<'_> {
    type Item = KeyResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let entry = match self.kind {
            NameKind::Subkeys => self.store.subkey_name(self.key.handle(), self.index),
            NameKind::Fields => self
                .store
                .value_entry(self.key.handle(), self.index)
                .map(|entry| entry.map(|(name, _)| name)),
        };
        match entry {
            Ok(Some(name)) => {
                self.index += 1;
                Some(Ok(name))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
        }
    }
}
