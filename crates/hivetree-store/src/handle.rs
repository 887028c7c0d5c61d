//! Handle tokens and the scoped-access guard.

use tracing::warn;

use crate::error::StoreResult;
use crate::traits::{Access, KeyStore};
use hivetree_types::Hive;

/// An opaque token for an open key, issued and interpreted by one store.
///
/// A handle does not pin anything: the key behind it can be removed at any
/// time, after which operations through the handle report `KeyNotFound`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyHandle(u64);

impl KeyHandle {
    /// Wrap a backend-native handle value.
    pub fn new(raw: u64) -> Self {
        KeyHandle(raw)
    }

    /// The backend-native handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// RAII guard around one open key: one open, one release, on every exit
/// path including error paths.
///
/// All of hivetree's primitive operations hold exactly one `ScopedKey` for
/// their duration and never carry one across a second store call sequence.
pub struct ScopedKey<'s> {
    store: &'s dyn KeyStore,
    handle: KeyHandle,
}

impl<'s> ScopedKey<'s> {
    /// Open an existing key; see [`KeyStore::open`].
    pub fn open(
        store: &'s dyn KeyStore,
        hive: Hive,
        path: &str,
        access: Access,
    ) -> StoreResult<Self> {
        let handle = store.open(hive, path, access)?;
        Ok(ScopedKey { store, handle })
    }

    /// Create-and-open a key; see [`KeyStore::create`].
    pub fn create(store: &'s dyn KeyStore, hive: Hive, path: &str) -> StoreResult<Self> {
        let handle = store.create(hive, path)?;
        Ok(ScopedKey { store, handle })
    }

    /// The wrapped handle, for passing to [`KeyStore`] operations.
    pub fn handle(&self) -> KeyHandle {
        self.handle
    }
}

impl Drop for ScopedKey<'_> {
    fn drop(&mut self) {
        // Release failure is unreportable from drop; the handle is gone
        // either way.
        if let Err(err) = self.store.close(self.handle) {
            warn!(handle = self.handle.raw(), %err, "failed to release key handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryKeyStore;
    use crate::traits::RawValue;

    #[test]
    fn guard_releases_on_drop() {
        let store = InMemoryKeyStore::new();
        {
            let key = ScopedKey::create(&store, Hive::CurrentUser, "Guarded").unwrap();
            assert_eq!(store.open_handles(), 1);
            drop(key);
        }
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn guard_releases_when_a_later_step_fails() {
        let store = InMemoryKeyStore::new();
        let outcome: StoreResult<()> = (|| {
            let key = ScopedKey::create(&store, Hive::CurrentUser, "Guarded")?;
            store.write_value(
                KeyHandle::new(key.handle().raw() + 999),
                "x",
                &RawValue { tag: 1, data: vec![] },
            )?;
            Ok(())
        })();
        assert!(outcome.is_err());
        assert_eq!(store.open_handles(), 0);
    }
}
