//! The store facade: hive resolution and root containers.

use hivetree_store::KeyStore;
use hivetree_types::Hive;

use crate::container::Container;
use crate::error::{KeyError, KeyResult};

/// Entry point into one hive of a backing store.
///
/// A `Registry` resolves a hive — by symbolic alias or by native handle —
/// and hands out [`Container`]s under it. Like them, it is a value object:
/// resolution is pure table lookup, no I/O.
#[derive(Clone, Copy)]
pub struct Registry<'s> {
    store: &'s dyn KeyStore,
    hive: Hive,
}

impl<'s> Registry<'s> {
    /// Resolve a symbolic hive alias (`"HKCU"`, `"hkey_local_machine"`,
    /// ...), case-insensitively over the closed alias table.
    pub fn resolve(store: &'s dyn KeyStore, alias: &str) -> KeyResult<Self> {
        let hive =
            Hive::from_alias(alias).ok_or_else(|| KeyError::UnknownHive(alias.to_string()))?;
        Ok(Registry { store, hive })
    }

    /// Use an already-resolved hive.
    pub fn with_hive(store: &'s dyn KeyStore, hive: Hive) -> Self {
        Registry { store, hive }
    }

    /// Pass through a native hive handle value unchanged.
    pub fn from_raw_handle(store: &'s dyn KeyStore, raw: u32) -> KeyResult<Self> {
        let hive = Hive::from_raw(raw).ok_or(KeyError::UnknownHiveHandle(raw))?;
        Ok(Registry { store, hive })
    }

    /// The resolved hive.
    pub fn hive(&self) -> Hive {
        self.hive
    }

    /// The hive root (empty path).
    pub fn root(&self) -> Container<'s> {
        Container::new(self.store, self.hive, "")
    }

    /// A container at `path` under this hive.
    pub fn container(&self, path: &str) -> Container<'s> {
        Container::new(self.store, self.hive, path)
    }
}

#[cfg(test)]
mod tests {
    use hivetree_store::InMemoryKeyStore;

    use super::*;

    #[test]
    fn aliases_resolve_case_insensitively() {
        let store = InMemoryKeyStore::new();
        assert_eq!(
            Registry::resolve(&store, "HKCU").unwrap().hive(),
            Hive::CurrentUser
        );
        assert_eq!(
            Registry::resolve(&store, "hkey_local_machine").unwrap().hive(),
            Hive::LocalMachine
        );
    }

    #[test]
    fn unknown_aliases_and_handles_are_errors() {
        let store = InMemoryKeyStore::new();
        assert!(matches!(
            Registry::resolve(&store, "HKXX"),
            Err(KeyError::UnknownHive(_))
        ));
        assert!(matches!(
            Registry::from_raw_handle(&store, 0xdead_beef),
            Err(KeyError::UnknownHiveHandle(0xdead_beef))
        ));
    }

    #[test]
    fn raw_handles_pass_through() {
        let store = InMemoryKeyStore::new();
        let registry = Registry::from_raw_handle(&store, Hive::Users.raw()).unwrap();
        assert_eq!(registry.hive(), Hive::Users);
    }

    #[test]
    fn containers_come_out_addressed_under_the_hive() {
        let store = InMemoryKeyStore::new();
        let registry = Registry::resolve(&store, "HKCU").unwrap();
        assert!(registry.root().is_root());
        let c = registry.container("Software\\App");
        assert_eq!(c.hive(), Hive::CurrentUser);
        assert_eq!(c.path(), "Software\\App");
        // Equivalent to navigating from the root.
        assert_eq!(c, registry.root().navigate("Software").navigate("App"));
    }
}
